// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stage internship management server.
//!
//! Every handler resolves the caller through [`auth_middleware`], loads the
//! addressed record, asks the access policy, and only then applies lifecycle
//! rules and writes to the store.

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod error;
pub mod jobs;
pub mod provisioning;
pub mod routes;
pub mod validation;

pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use error::ServerError;
pub use stage_server_config::ServerConfig;
