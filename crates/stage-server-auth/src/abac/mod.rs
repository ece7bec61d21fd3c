// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-based access policy.
//!
//! 1. **Types** ([`types`]): the [`Action`] requested and the [`ResourceAttrs`] of the
//!    thing being touched
//! 2. **Policies** ([`policies`]): one evaluator per resource type
//! 3. **Engine** ([`engine`]): [`can_access`], which applies the active-account gate
//!    and routes to the right policy
//!
//! ```text
//! can_access(principal, action, resource)
//!     │
//!     ├── principal inactive → deny
//!     │
//!     └── Route to resource-specific policy:
//!         ├── Request    → request::evaluate()
//!         ├── Document   → document::evaluate()
//!         ├── Evaluation → evaluation::evaluate()
//!         ├── Internship → internship::evaluate()
//!         └── User       → user::evaluate()
//! ```
//!
//! # Example
//!
//! ```
//! use stage_server_auth::abac::{can_access, Action, ResourceAttrs};
//! use stage_server_auth::{Principal, Role};
//!
//! let tutor = Principal::new("t@example.com", "Tutor", Role::Tutor);
//! let intern = Principal::new("i@example.com", "Intern", Role::Intern);
//!
//! let request = ResourceAttrs::request(intern.id, Some(tutor.id));
//! assert!(can_access(&tutor, Action::Read, &request));
//! assert!(!can_access(&tutor, Action::WriteStatus, &request));
//! ```

pub mod engine;
pub mod policies;
pub mod types;

pub use engine::*;
pub use types::*;
