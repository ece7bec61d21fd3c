// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the Stage server.
//!
//! One repository per table, each behind an `#[async_trait]` store trait so the
//! HTTP layer can be tested against alternative implementations.

pub mod audit;
pub mod document;
pub mod error;
pub mod evaluation;
pub mod internship;
pub mod link;
pub mod migrations;
pub mod pool;
pub mod request;
mod row;
pub mod scope;
pub mod session;
pub mod user;

#[cfg(test)]
mod testing;

pub use audit::{AuditEntry, AuditRepository, AuditStore};
pub use document::{DocumentRepository, DocumentStore};
pub use error::{DbError, Result};
pub use evaluation::{EvaluationRepository, EvaluationStore};
pub use internship::{InternshipRepository, InternshipStore};
pub use link::{LinkRepository, LinkStore};
pub use migrations::run_migrations;
pub use pool::create_pool;
pub use request::{RequestRepository, RequestStore};
pub use scope::ListScope;
pub use session::{SessionRepository, SessionStore};
pub use user::{UserRepository, UserStore};
