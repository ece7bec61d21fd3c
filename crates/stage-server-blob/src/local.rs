// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, instrument};

use crate::{validate_key, BlobError, BlobStore};

/// Blobs as files under a root directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written file.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
	root: PathBuf,
}

impl LocalBlobStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
		validate_key(key)?;
		Ok(self.root.join(key))
	}
}

#[async_trait]
impl BlobStore for LocalBlobStore {
	#[instrument(skip(self, data), fields(size = data.len()))]
	async fn put(&self, key: &str, data: Bytes) -> Result<(), BlobError> {
		let path = self.path_for(key)?;
		if let Some(parent) = path.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}

		let tmp = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
		tokio::fs::write(&tmp, &data).await?;
		if let Err(e) = tokio::fs::rename(&tmp, &path).await {
			let _ = tokio::fs::remove_file(&tmp).await;
			return Err(e.into());
		}

		debug!(key, "blob stored");
		Ok(())
	}

	#[instrument(skip(self))]
	async fn get(&self, key: &str) -> Result<Bytes, BlobError> {
		let path = self.path_for(key)?;
		match tokio::fs::read(&path).await {
			Ok(data) => Ok(Bytes::from(data)),
			Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(key.to_string())),
			Err(e) => Err(e.into()),
		}
	}

	#[instrument(skip(self))]
	async fn remove(&self, key: &str) -> Result<bool, BlobError> {
		let path = self.path_for(key)?;
		match tokio::fs::remove_file(&path).await {
			Ok(()) => {
				debug!(key, "blob removed");
				Ok(true)
			}
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
			Err(e) => Err(e.into()),
		}
	}
}
