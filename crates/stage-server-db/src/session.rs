// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session repository. Only the SHA-256 hash of a session token is stored.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use stage_server_auth::{Session, SessionId};

use crate::error::Result;
use crate::row::{parse, parse_timestamp, timestamp};

#[async_trait]
pub trait SessionStore: Send + Sync {
	async fn create_session(&self, session: &Session, token_hash: &str) -> Result<()>;
	async fn get_session_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>>;
	async fn get_session(&self, id: &SessionId) -> Result<Option<Session>>;
	async fn touch_session(&self, id: &SessionId) -> Result<()>;
	async fn delete_session(&self, id: &SessionId) -> Result<bool>;
	async fn delete_expired_sessions(&self) -> Result<u64>;
}

#[async_trait]
impl SessionStore for SessionRepository {
	async fn create_session(&self, session: &Session, token_hash: &str) -> Result<()> {
		self.create_session(session, token_hash).await
	}

	async fn get_session_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>> {
		self.get_session_by_token_hash(token_hash).await
	}

	async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
		self.get_session(id).await
	}

	async fn touch_session(&self, id: &SessionId) -> Result<()> {
		self.touch_session(id).await
	}

	async fn delete_session(&self, id: &SessionId) -> Result<bool> {
		self.delete_session(id).await
	}

	async fn delete_expired_sessions(&self) -> Result<u64> {
		self.delete_expired_sessions().await
	}
}

#[derive(Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
}

impl SessionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, session, token_hash), fields(session_id = %session.id, user_id = %session.user_id))]
	pub async fn create_session(&self, session: &Session, token_hash: &str) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO sessions (id, user_id, token_hash, created_at, last_used_at, expires_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(session.id.to_string())
		.bind(session.user_id.to_string())
		.bind(token_hash)
		.bind(timestamp(session.created_at))
		.bind(timestamp(session.last_used_at))
		.bind(timestamp(session.expires_at))
		.execute(&self.pool)
		.await?;

		tracing::debug!(session_id = %session.id, "session created");
		Ok(())
	}

	/// Look up a session by token hash. Expired sessions are returned as-is;
	/// the caller decides.
	#[tracing::instrument(skip(self, token_hash))]
	pub async fn get_session_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, created_at, last_used_at, expires_at
			FROM sessions
			WHERE token_hash = ?
			"#,
		)
		.bind(token_hash)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|row| parse_session_row(&row)).transpose()
	}

	/// Look up a session by id, for signed tokens bound to a login session.
	#[tracing::instrument(skip(self), fields(session_id = %id))]
	pub async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, created_at, last_used_at, expires_at
			FROM sessions
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|row| parse_session_row(&row)).transpose()
	}

	#[tracing::instrument(skip(self), fields(session_id = %id))]
	pub async fn touch_session(&self, id: &SessionId) -> Result<()> {
		sqlx::query("UPDATE sessions SET last_used_at = ? WHERE id = ?")
			.bind(timestamp(Utc::now()))
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(session_id = %id))]
	pub async fn delete_session(&self, id: &SessionId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self))]
	pub async fn delete_expired_sessions(&self) -> Result<u64> {
		let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
			.bind(timestamp(Utc::now()))
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected();
		if deleted > 0 {
			tracing::info!(deleted, "expired sessions removed");
		}
		Ok(deleted)
	}
}

fn parse_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<Session> {
	let id: String = row.get("id");
	let user_id: String = row.get("user_id");
	let created_at: String = row.get("created_at");
	let last_used_at: String = row.get("last_used_at");
	let expires_at: String = row.get("expires_at");

	Ok(Session {
		id: parse(&id, "session id")?,
		user_id: parse(&user_id, "user_id")?,
		created_at: parse_timestamp(&created_at, "created_at")?,
		last_used_at: parse_timestamp(&last_used_at, "last_used_at")?,
		expires_at: parse_timestamp(&expires_at, "expires_at")?,
	})
}
