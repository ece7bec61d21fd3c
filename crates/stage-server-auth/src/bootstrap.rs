// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment gate for bootstrap admin provisioning.
//!
//! Bootstrap provisioning creates or promotes an active admin so a fresh
//! environment can be set up. It is never a session operation: the caller presents
//! a configured token in the [`BOOTSTRAP_TOKEN_HEADER`] header, and the gate only
//! opens outside production when explicitly enabled.

use subtle::ConstantTimeEq;
use tracing::warn;

use crate::AuthError;

/// Header carrying the bootstrap token.
pub const BOOTSTRAP_TOKEN_HEADER: &str = "x-bootstrap-token";

/// Whether bootstrap provisioning may run, and with which token.
#[derive(Clone)]
pub struct BootstrapGate {
	enabled: bool,
	is_production: bool,
	token: Option<String>,
}

impl std::fmt::Debug for BootstrapGate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BootstrapGate")
			.field("enabled", &self.enabled)
			.field("is_production", &self.is_production)
			.field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
			.finish()
	}
}

impl BootstrapGate {
	pub fn new(enabled: bool, is_production: bool, token: Option<String>) -> Self {
		Self {
			enabled,
			is_production,
			token,
		}
	}

	/// A gate that never opens.
	pub fn closed() -> Self {
		Self::new(false, true, None)
	}

	/// The route is mounted only when this is true.
	pub fn is_open(&self) -> bool {
		self.enabled && !self.is_production && self.token.is_some()
	}

	/// Check a presented token against the configured one.
	pub fn authorize(&self, presented: Option<&str>) -> Result<(), AuthError> {
		if !self.is_open() {
			return Err(AuthError::BootstrapDisabled);
		}
		let Some(expected) = self.token.as_deref() else {
			return Err(AuthError::BootstrapDisabled);
		};
		let Some(presented) = presented else {
			warn!("bootstrap provisioning refused: missing token");
			return Err(AuthError::AuthenticationRequired);
		};
		if verify_bootstrap_token(expected, presented) {
			Ok(())
		} else {
			warn!("bootstrap provisioning refused: invalid token");
			Err(AuthError::InvalidCredentials)
		}
	}
}

/// Constant-time comparison of the configured and presented tokens.
pub fn verify_bootstrap_token(expected: &str, presented: &str) -> bool {
	let expected = expected.as_bytes();
	let presented = presented.trim().as_bytes();
	if expected.is_empty() || expected.len() != presented.len() {
		return false;
	}
	expected.ct_eq(presented).into()
}
