// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a resolved config and a partial layer
//! that sources produce and merge.

mod auth;
mod database;
mod http;
mod internships;
mod logging;
mod storage;

pub use auth::{AuthConfig, AuthConfigLayer, PRODUCTION};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use internships::{InternshipsConfig, InternshipsConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use storage::{StorageConfig, StorageConfigLayer, DEFAULT_MAX_UPLOAD_BYTES};
