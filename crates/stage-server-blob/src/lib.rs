// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blob storage for document bytes.
//!
//! Keys are opaque relative paths such as `{owner_id}/{millis}_{name}`. Absolute
//! paths and `.`/`..` components are rejected before any I/O happens.

mod error;
mod local;
mod memory;

pub use error::BlobError;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait BlobStore: Send + Sync {
	/// Store `data` under `key`, replacing any existing blob.
	async fn put(&self, key: &str, data: Bytes) -> Result<(), BlobError>;

	/// # Errors
	/// `BlobError::NotFound` if nothing is stored under `key`.
	async fn get(&self, key: &str) -> Result<Bytes, BlobError>;

	/// Remove the blob. Returns `false` if it did not exist.
	async fn remove(&self, key: &str) -> Result<bool, BlobError>;
}

/// Check that `key` is a non-empty relative path without traversal.
pub fn validate_key(key: &str) -> Result<(), BlobError> {
	let invalid = |reason: &str| Err(BlobError::InvalidKey(format!("{key:?}: {reason}")));

	if key.is_empty() {
		return invalid("empty key");
	}
	if key.starts_with('/') || key.contains('\\') || key.contains('\0') {
		return invalid("must be a relative path");
	}
	for component in key.split('/') {
		match component {
			"" => return invalid("empty path component"),
			"." | ".." => return invalid("relative path component"),
			_ => {}
		}
	}
	Ok(())
}
