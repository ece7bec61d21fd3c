// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Embedded schema migrations, applied in order at startup.

use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::Result;

const MIGRATIONS: &[(i64, &str, &str)] = &[(
	1,
	"initial",
	include_str!("../migrations/001_initial.sql"),
)];

/// Apply every migration not yet recorded in `schema_migrations`.
///
/// Each migration runs in its own transaction together with its bookkeeping row,
/// so a failed migration leaves no partial schema behind.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS schema_migrations (
			version INTEGER PRIMARY KEY NOT NULL,
			name TEXT NOT NULL,
			applied_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	let applied: Vec<i64> = sqlx::query("SELECT version FROM schema_migrations")
		.fetch_all(pool)
		.await?
		.iter()
		.map(|row| row.get("version"))
		.collect();

	for &(version, name, sql) in MIGRATIONS {
		if applied.contains(&version) {
			continue;
		}

		let mut tx = pool.begin().await?;
		sqlx::raw_sql(sql).execute(&mut *tx).await?;
		sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
			.bind(version)
			.bind(name)
			.bind(Utc::now().to_rfc3339())
			.execute(&mut *tx)
			.await?;
		tx.commit().await?;

		tracing::info!(version, name, "applied migration");
	}

	Ok(())
}
