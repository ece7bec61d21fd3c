// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use stage_server_auth::{Principal, Role, UserId};
use stage_workflow_core::{Internship, InternshipDefaults};
use std::str::FromStr;

use crate::internship::InternshipRepository;
use crate::migrations::run_migrations;
use crate::user::UserRepository;

/// In-memory database with the full schema. One connection, since every
/// `:memory:` connection is its own database.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool");

	run_migrations(&pool).await.unwrap();
	pool
}

pub async fn insert_user(pool: &SqlitePool, role: Role) -> Principal {
	let id = UserId::generate();
	let principal = Principal {
		id,
		..Principal::new(format!("{id}@example.test"), format!("User {role}"), role)
	};
	UserRepository::new(pool.clone())
		.create_user(&principal, None)
		.await
		.unwrap();
	principal
}

pub async fn insert_internship(
	pool: &SqlitePool,
	intern: &Principal,
	tutor: Option<&Principal>,
) -> Internship {
	let internship = InternshipDefaults::default().build(intern.id, tutor.map(|t| t.id), Utc::now());
	InternshipRepository::new(pool.clone())
		.create_internship(&internship)
		.await
		.unwrap();
	internship
}
