// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod support;

mod admin;
mod auth;
mod documents;
mod evaluations;
mod internships;
mod requests;
