// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication, token and bootstrap configuration.
//!
//! Secrets (`jwt_secret`, `bootstrap_token`) are only read from the environment,
//! never from the config file.

use serde::Deserialize;

use crate::secret::SecretString;

pub const PRODUCTION: &str = "production";

#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Deployment environment name. Anything other than `production` is treated
	/// as a development deployment.
	pub environment: String,
	pub session_ttl_hours: u64,
	pub jwt_secret: Option<SecretString>,
	pub jwt_issuer: String,
	pub jwt_ttl_minutes: u64,
	pub cookie_secure: bool,
	pub bootstrap_enabled: bool,
	pub bootstrap_token: Option<SecretString>,
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case(PRODUCTION)
	}
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub session_ttl_hours: Option<u64>,
	#[serde(skip)]
	pub jwt_secret: Option<SecretString>,
	#[serde(default)]
	pub jwt_issuer: Option<String>,
	#[serde(default)]
	pub jwt_ttl_minutes: Option<u64>,
	#[serde(default)]
	pub cookie_secure: Option<bool>,
	#[serde(default)]
	pub bootstrap_enabled: Option<bool>,
	#[serde(skip)]
	pub bootstrap_token: Option<SecretString>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.session_ttl_hours.is_some() {
			self.session_ttl_hours = other.session_ttl_hours;
		}
		if other.jwt_secret.is_some() {
			self.jwt_secret = other.jwt_secret;
		}
		if other.jwt_issuer.is_some() {
			self.jwt_issuer = other.jwt_issuer;
		}
		if other.jwt_ttl_minutes.is_some() {
			self.jwt_ttl_minutes = other.jwt_ttl_minutes;
		}
		if other.cookie_secure.is_some() {
			self.cookie_secure = other.cookie_secure;
		}
		if other.bootstrap_enabled.is_some() {
			self.bootstrap_enabled = other.bootstrap_enabled;
		}
		if other.bootstrap_token.is_some() {
			self.bootstrap_token = other.bootstrap_token;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		let environment = self.environment.unwrap_or_else(|| "development".to_string());
		let production = environment.eq_ignore_ascii_case(PRODUCTION);
		AuthConfig {
			session_ttl_hours: self.session_ttl_hours.unwrap_or(24),
			jwt_secret: self.jwt_secret.filter(|s| !s.is_empty()),
			jwt_issuer: self.jwt_issuer.unwrap_or_else(|| "stage".to_string()),
			jwt_ttl_minutes: self.jwt_ttl_minutes.unwrap_or(60),
			cookie_secure: self.cookie_secure.unwrap_or(production),
			bootstrap_enabled: self.bootstrap_enabled.unwrap_or(false),
			bootstrap_token: self.bootstrap_token.filter(|s| !s.is_empty()),
			environment,
		}
	}
}
