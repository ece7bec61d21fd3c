// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User (principal) repository.
//!
//! Users are never deleted; deactivation flips `is_active`. The email column is
//! unique and stored normalized (trimmed, lower-cased) by the caller.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use stage_server_auth::{Principal, Role, UserId};

use crate::error::{DbError, Result};
use crate::row::{parse, parse_timestamp, timestamp};

const USER_COLUMNS: &str = "id, email, name, role, is_active, phone, department, position, \
	address, created_at, updated_at";

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(&self, principal: &Principal, password_hash: Option<&str>) -> Result<()>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<Principal>>;
	async fn get_user_by_email(&self, email: &str) -> Result<Option<Principal>>;
	async fn get_credentials_by_email(&self, email: &str) -> Result<Option<(Principal, Option<String>)>>;
	async fn list_users(&self) -> Result<Vec<Principal>>;
	async fn update_role(&self, id: &UserId, role: Role) -> Result<bool>;
	async fn set_active(&self, id: &UserId, is_active: bool) -> Result<bool>;
	async fn update_profile(&self, principal: &Principal) -> Result<bool>;
	async fn set_password_hash(&self, id: &UserId, password_hash: &str) -> Result<bool>;
	async fn upsert_admin(&self, email: &str, name: &str, password_hash: Option<&str>) -> Result<Principal>;
}

#[async_trait]
impl UserStore for UserRepository {
	async fn create_user(&self, principal: &Principal, password_hash: Option<&str>) -> Result<()> {
		self.create_user(principal, password_hash).await
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<Principal>> {
		self.get_user_by_id(id).await
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<Principal>> {
		self.get_user_by_email(email).await
	}

	async fn get_credentials_by_email(&self, email: &str) -> Result<Option<(Principal, Option<String>)>> {
		self.get_credentials_by_email(email).await
	}

	async fn list_users(&self) -> Result<Vec<Principal>> {
		self.list_users().await
	}

	async fn update_role(&self, id: &UserId, role: Role) -> Result<bool> {
		self.update_role(id, role).await
	}

	async fn set_active(&self, id: &UserId, is_active: bool) -> Result<bool> {
		self.set_active(id, is_active).await
	}

	async fn update_profile(&self, principal: &Principal) -> Result<bool> {
		self.update_profile(principal).await
	}

	async fn set_password_hash(&self, id: &UserId, password_hash: &str) -> Result<bool> {
		self.set_password_hash(id, password_hash).await
	}

	async fn upsert_admin(&self, email: &str, name: &str, password_hash: Option<&str>) -> Result<Principal> {
		self.upsert_admin(email, name, password_hash).await
	}
}

#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a new user.
	///
	/// # Errors
	/// `DbError::Conflict` if the email is already taken.
	#[tracing::instrument(skip(self, principal, password_hash), fields(user_id = %principal.id, role = %principal.role))]
	pub async fn create_user(&self, principal: &Principal, password_hash: Option<&str>) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO users (
				id, email, name, role, is_active, password_hash, phone, department,
				position, address, created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(principal.id.to_string())
		.bind(&principal.email)
		.bind(&principal.name)
		.bind(principal.role.as_str())
		.bind(principal.is_active)
		.bind(password_hash)
		.bind(&principal.phone)
		.bind(&principal.department)
		.bind(&principal.position)
		.bind(&principal.address)
		.bind(timestamp(principal.created_at))
		.bind(timestamp(principal.updated_at))
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::from_insert(e, "user with this email"))?;

		tracing::debug!(user_id = %principal.id, "user created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<Principal>> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|row| parse_user_row(&row)).transpose()
	}

	#[tracing::instrument(skip(self, email))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<Principal>> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
			.bind(email)
			.fetch_optional(&self.pool)
			.await?;

		row.map(|row| parse_user_row(&row)).transpose()
	}

	/// Profile plus stored password hash, for login.
	#[tracing::instrument(skip(self, email))]
	pub async fn get_credentials_by_email(&self, email: &str) -> Result<Option<(Principal, Option<String>)>> {
		let row = sqlx::query(&format!(
			"SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
		))
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => {
				let principal = parse_user_row(&row)?;
				let hash: Option<String> = row.get("password_hash");
				Ok(Some((principal, hash)))
			}
			None => Ok(None),
		}
	}

	/// All users, newest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_users(&self) -> Result<Vec<Principal>> {
		let rows = sqlx::query(&format!(
			"SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id ASC"
		))
		.fetch_all(&self.pool)
		.await?;

		let users = rows.iter().map(parse_user_row).collect::<Result<Vec<_>>>()?;
		tracing::debug!(count = users.len(), "listed users");
		Ok(users)
	}

	/// Returns `false` if the user does not exist.
	#[tracing::instrument(skip(self), fields(user_id = %id, role = %role))]
	pub async fn update_role(&self, id: &UserId, role: Role) -> Result<bool> {
		let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
			.bind(role.as_str())
			.bind(timestamp(Utc::now()))
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Returns `false` if the user does not exist.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn set_active(&self, id: &UserId, is_active: bool) -> Result<bool> {
		let result = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
			.bind(is_active)
			.bind(timestamp(Utc::now()))
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Write the self-editable profile fields (name and contact details).
	/// Role, status and email are not touched. Returns `false` if the user does
	/// not exist.
	#[tracing::instrument(skip(self, principal), fields(user_id = %principal.id))]
	pub async fn update_profile(&self, principal: &Principal) -> Result<bool> {
		let result = sqlx::query(
			r#"
			UPDATE users
			SET name = ?, phone = ?, department = ?, position = ?, address = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&principal.name)
		.bind(&principal.phone)
		.bind(&principal.department)
		.bind(&principal.position)
		.bind(&principal.address)
		.bind(timestamp(principal.updated_at))
		.bind(principal.id.to_string())
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Returns `false` if the user does not exist.
	#[tracing::instrument(skip(self, password_hash), fields(user_id = %id))]
	pub async fn set_password_hash(&self, id: &UserId, password_hash: &str) -> Result<bool> {
		let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
			.bind(password_hash)
			.bind(timestamp(Utc::now()))
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Create an active admin, or promote and reactivate the existing user with
	/// this email. An existing password hash is only replaced when a new one is
	/// supplied.
	#[tracing::instrument(skip(self, email, password_hash))]
	pub async fn upsert_admin(&self, email: &str, name: &str, password_hash: Option<&str>) -> Result<Principal> {
		let now = timestamp(Utc::now());
		let new_id = UserId::generate();

		sqlx::query(
			r#"
			INSERT INTO users (id, email, name, role, is_active, password_hash, created_at, updated_at)
			VALUES (?, ?, ?, 'admin', 1, ?, ?, ?)
			ON CONFLICT(email) DO UPDATE SET
				role = 'admin',
				is_active = 1,
				password_hash = COALESCE(excluded.password_hash, users.password_hash),
				updated_at = excluded.updated_at
			"#,
		)
		.bind(new_id.to_string())
		.bind(email)
		.bind(name)
		.bind(password_hash)
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		let principal = self
			.get_user_by_email(email)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("user {email}")))?;

		tracing::info!(user_id = %principal.id, "admin provisioned");
		Ok(principal)
	}
}

fn parse_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<Principal> {
	let id: String = row.get("id");
	let role: String = row.get("role");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Principal {
		id: parse(&id, "user id")?,
		email: row.get("email"),
		name: row.get("name"),
		role: parse(&role, "role")?,
		is_active: row.get("is_active"),
		phone: row.get("phone"),
		department: row.get("department"),
		position: row.get("position"),
		address: row.get("address"),
		created_at: parse_timestamp(&created_at, "created_at")?,
		updated_at: parse_timestamp(&updated_at, "updated_at")?,
	})
}
