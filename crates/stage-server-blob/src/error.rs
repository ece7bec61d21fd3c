// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
	#[error("Blob not found: {0}")]
	NotFound(String),

	#[error("Invalid blob key: {0}")]
	InvalidKey(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}
