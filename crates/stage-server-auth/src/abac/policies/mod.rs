// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource-specific policy modules.

pub mod document;
pub mod evaluation;
pub mod internship;
pub mod request;
pub mod user;
