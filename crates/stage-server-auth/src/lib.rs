// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and role-based access control for the Stage internship server.
//!
//! This crate provides:
//! - Identity types ([`UserId`], [`Role`], [`Principal`])
//! - Session tokens and signed bearer tokens
//! - Password hashing for the login endpoint
//! - The access policy engine ([`can_access`]) consulted before every read and write
//! - The environment gate for bootstrap admin provisioning
//!
//! # Source of truth
//!
//! A credential only proves *who* is calling. The role and active flag always come
//! from the profile store; a `role` claim embedded in a signed token is a hint that
//! is compared and logged, never trusted.
//!
//! # Policy shape
//!
//! Every decision is a pure function of a [`Principal`], an [`Action`] and a set of
//! [`ResourceAttrs`]. Nothing in the policy engine touches the database, so callers
//! load the resource first, build its attributes, then ask.

pub mod abac;
mod argon2_config;
pub mod audit;
pub mod bootstrap;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;
pub mod types;

pub use abac::{can_access, Action, ResourceAttrs, ResourceType};
pub use audit::AuditEventType;
pub use bootstrap::{verify_bootstrap_token, BootstrapGate, BOOTSTRAP_TOKEN_HEADER};
pub use error::AuthError;
pub use jwt::{Claims, JwtService};
pub use middleware::{
	extract_bearer_token, extract_session_cookie, extract_session_cookie_with_name, AuthContext,
	CredentialSource, CurrentUser, SESSION_COOKIE_NAME,
};
pub use password::{hash_password, verify_login_password, verify_password, MIN_PASSWORD_LEN};
pub use session::{generate_session_token, hash_token, Session};
pub use types::{
	AuditId, DocumentId, EvaluationId, InternshipId, LinkId, Principal, RequestId, Role,
	SessionId, UserId,
};
