// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blob storage configuration.

use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct StorageConfig {
	pub root: PathBuf,
	pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
	fn default() -> Self {
		StorageConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfigLayer {
	#[serde(default)]
	pub root: Option<PathBuf>,
	#[serde(default)]
	pub max_upload_bytes: Option<u64>,
}

impl StorageConfigLayer {
	pub fn merge(&mut self, other: StorageConfigLayer) {
		if other.root.is_some() {
			self.root = other.root;
		}
		if other.max_upload_bytes.is_some() {
			self.max_upload_bytes = other.max_upload_bytes;
		}
	}

	pub fn finalize(self) -> StorageConfig {
		StorageConfig {
			root: self.root.unwrap_or_else(|| PathBuf::from("./data/blobs")),
			max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
		}
	}
}
