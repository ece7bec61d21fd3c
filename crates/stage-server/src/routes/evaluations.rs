// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Evaluation handlers.
//!
//! # Authorization Matrix
//!
//! | Endpoint            | Allowed                                          |
//! |---------------------|--------------------------------------------------|
//! | `list_evaluations`  | any active principal, rows filtered by policy    |
//! | `create_evaluation` | admin, rh, tutor (as themselves)                 |
//! | `get_evaluation`    | admin, rh, evaluating tutor, evaluated intern    |
//! | `update_evaluation` | admin, rh, evaluating tutor; never once finalized |
//! | `delete_evaluation` | admin, rh; never once finalized                  |
//! | `evaluation_stats`  | admin, rh                                        |

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use chrono::Utc;
use stage_server_api::{
	ApiResponse, CreateEvaluationRequest, ErrorResponse, EvaluationResponse,
	EvaluationStatsResponse, UpdateEvaluationRequest,
};
use stage_server_auth::{
	can_access, Action, EvaluationId, InternshipId, Principal, ResourceAttrs, Role, UserId,
};
use stage_server_db::ListScope;
use stage_workflow_core::{
	Evaluation, EvaluationPatch, EvaluationStats, EvaluationStatus, Scores, WorkflowError,
};

use super::authorize;
use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ServerError,
	validation::{parse_enum, parse_id},
};

async fn load_evaluation(state: &AppState, id: &str) -> Result<Evaluation, ServerError> {
	let id: EvaluationId = parse_id(id, "id")?;
	state
		.evaluation_repo
		.get_evaluation(&id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("evaluation {id}")))
}

/// GET /api/evaluations - Evaluations visible to the caller, with `total`.
#[utoipa::path(
    get,
    path = "/api/evaluations",
    responses(
        (status = 200, description = "Visible evaluations", body = [EvaluationResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn list_evaluations(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;
	let evaluations = state
		.evaluation_repo
		.list_evaluations(ListScope::for_principal(principal))
		.await?;

	let data: Vec<EvaluationResponse> = evaluations
		.iter()
		.filter(|e| can_access(principal, Action::Read, &e.attrs()))
		.map(EvaluationResponse::from)
		.collect();
	Ok(Json(ApiResponse::list(data)))
}

/// The evaluator recorded on a new evaluation. Tutors always evaluate as
/// themselves; staff may name another existing user.
async fn resolve_evaluator(
	state: &AppState,
	principal: &Principal,
	requested: Option<&str>,
) -> Result<UserId, ServerError> {
	let requested = requested.map(str::trim).filter(|s| !s.is_empty());
	let Some(raw) = requested else {
		return Ok(principal.id);
	};

	let evaluator_id: UserId = parse_id(raw, "evaluator_id")?;
	if evaluator_id == principal.id {
		return Ok(evaluator_id);
	}
	if principal.role == Role::Tutor {
		return Err(ServerError::Forbidden(
			"tutors may only evaluate as themselves".to_string(),
		));
	}
	if state.user_repo.get_user_by_id(&evaluator_id).await?.is_none() {
		return Err(ServerError::field("evaluator_id", "user not found"));
	}
	Ok(evaluator_id)
}

/// POST /api/evaluations
#[utoipa::path(
    post,
    path = "/api/evaluations",
    request_body = CreateEvaluationRequest,
    responses(
        (status = 201, description = "Evaluation created", body = EvaluationResponse),
        (status = 400, description = "Invalid scores, period or names", body = ErrorResponse),
        (status = 403, description = "Not allowed to evaluate", body = ErrorResponse),
        (status = 404, description = "Internship not found", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[tracing::instrument(skip(state, current_user, body), fields(actor_id = %current_user.principal.id))]
pub async fn create_evaluation(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Json(body): Json<CreateEvaluationRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;
	authorize(
		principal,
		Action::Create,
		&ResourceAttrs::evaluation(None, principal.id),
	)?;

	let internship_id: InternshipId = parse_id(&body.internship_id, "internship_id")?;
	let internship = state
		.internship_repo
		.get_internship(&internship_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("internship {internship_id}")))?;

	let evaluator_id = resolve_evaluator(&state, principal, body.evaluator_id.as_deref()).await?;
	let evaluation_type = parse_enum(&body.evaluation_type, "type")?;
	let status = match body.status.as_deref() {
		Some(raw) => parse_enum(raw, "status")?,
		None => EvaluationStatus::Draft,
	};
	let scores = Scores::try_new(
		body.technical,
		body.interpersonal,
		body.autonomy,
		body.punctuality,
		body.motivation,
	)?;

	let evaluation = Evaluation::new(
		internship.id,
		Some(internship.user_id),
		evaluator_id,
		evaluation_type,
		body.period_start,
		body.period_end,
		scores,
		status,
		Utc::now(),
	)?
	.with_comments(body.strengths, body.improvements, body.general_comment);

	state.evaluation_repo.create_evaluation(&evaluation).await?;
	tracing::info!(
		evaluation_id = %evaluation.id,
		internship_id = %internship.id,
		overall_score = evaluation.overall_score,
		"evaluation created"
	);

	Ok((
		StatusCode::CREATED,
		Json(ApiResponse::ok(EvaluationResponse::from(&evaluation)).with_message("Evaluation created")),
	))
}

/// GET /api/evaluations/{id}
#[utoipa::path(
    get,
    path = "/api/evaluations/{id}",
    params(("id" = String, Path, description = "Evaluation ID")),
    responses(
        (status = 200, description = "The evaluation", body = EvaluationResponse),
        (status = 403, description = "Not allowed to read", body = ErrorResponse),
        (status = 404, description = "Evaluation not found", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn get_evaluation(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let evaluation = load_evaluation(&state, &id).await?;
	authorize(&current_user.principal, Action::Read, &evaluation.attrs())?;
	Ok(Json(ApiResponse::ok(EvaluationResponse::from(&evaluation))))
}

fn to_patch(body: UpdateEvaluationRequest) -> Result<EvaluationPatch, ServerError> {
	Ok(EvaluationPatch {
		evaluation_type: body
			.evaluation_type
			.as_deref()
			.map(|t| parse_enum(t, "type"))
			.transpose()?,
		period_start: body.period_start,
		period_end: body.period_end,
		technical: body.technical,
		interpersonal: body.interpersonal,
		autonomy: body.autonomy,
		punctuality: body.punctuality,
		motivation: body.motivation,
		strengths: body.strengths,
		improvements: body.improvements,
		general_comment: body.general_comment,
		status: body
			.status
			.as_deref()
			.map(|s| parse_enum(s, "status"))
			.transpose()?,
	})
}

/// PUT /api/evaluations/{id} - Partial update; the overall score is recomputed.
///
/// A finalized evaluation is immutable and answers `evaluation_finalized`.
#[utoipa::path(
    put,
    path = "/api/evaluations/{id}",
    params(("id" = String, Path, description = "Evaluation ID")),
    request_body = UpdateEvaluationRequest,
    responses(
        (status = 200, description = "Updated evaluation", body = EvaluationResponse),
        (status = 400, description = "Invalid values or evaluation finalized", body = ErrorResponse),
        (status = 403, description = "Not allowed to update", body = ErrorResponse),
        (status = 404, description = "Evaluation not found", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[tracing::instrument(skip(state, current_user, body), fields(actor_id = %current_user.principal.id))]
pub async fn update_evaluation(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(body): Json<UpdateEvaluationRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let mut evaluation = load_evaluation(&state, &id).await?;
	authorize(&current_user.principal, Action::Update, &evaluation.attrs())?;

	let patch = to_patch(body)?;
	evaluation.apply(patch, Utc::now())?;

	if !state.evaluation_repo.update_evaluation(&evaluation).await? {
		// Deleted or finalized since we read it.
		return match state.evaluation_repo.get_evaluation(&evaluation.id).await? {
			None => Err(ServerError::NotFound(format!("evaluation {}", evaluation.id))),
			Some(_) => Err(WorkflowError::EvaluationFinalized.into()),
		};
	}

	tracing::info!(evaluation_id = %evaluation.id, status = %evaluation.status, "evaluation updated");
	Ok(Json(
		ApiResponse::ok(EvaluationResponse::from(&evaluation)).with_message("Evaluation updated"),
	))
}

/// DELETE /api/evaluations/{id}
#[utoipa::path(
    delete,
    path = "/api/evaluations/{id}",
    params(("id" = String, Path, description = "Evaluation ID")),
    responses(
        (status = 200, description = "Evaluation deleted"),
        (status = 400, description = "Evaluation finalized", body = ErrorResponse),
        (status = 403, description = "Not allowed to delete", body = ErrorResponse),
        (status = 404, description = "Evaluation not found", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn delete_evaluation(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let evaluation = load_evaluation(&state, &id).await?;
	authorize(&current_user.principal, Action::Delete, &evaluation.attrs())?;

	if evaluation.is_finalized() {
		return Err(WorkflowError::EvaluationFinalized.into());
	}
	if !state.evaluation_repo.delete_evaluation(&evaluation.id).await? {
		return Err(ServerError::NotFound(format!("evaluation {}", evaluation.id)));
	}

	tracing::info!(evaluation_id = %evaluation.id, "evaluation deleted");
	Ok(Json(ApiResponse::ok(()).with_message("Evaluation deleted")))
}

/// GET /api/evaluations/stats - Aggregates over every evaluation.
#[utoipa::path(
    get,
    path = "/api/evaluations/stats",
    responses(
        (status = 200, description = "Evaluation statistics", body = EvaluationStatsResponse),
        (status = 403, description = "Staff only", body = ErrorResponse)
    ),
    tag = "evaluations"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn evaluation_stats(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	authorize(
		&current_user.principal,
		Action::ViewStats,
		&ResourceAttrs::evaluations(),
	)?;

	let evaluations = state.evaluation_repo.list_evaluations(ListScope::All).await?;
	let stats = EvaluationStats::compute(&evaluations);
	Ok(Json(ApiResponse::ok(EvaluationStatsResponse::from(stats))))
}
