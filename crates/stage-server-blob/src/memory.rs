// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{validate_key, BlobError, BlobStore};

/// In-process blob store for tests and ephemeral deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
	blobs: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryBlobStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn len(&self) -> usize {
		self.blobs.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.blobs.read().await.is_empty()
	}

	pub async fn contains(&self, key: &str) -> bool {
		self.blobs.read().await.contains_key(key)
	}
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
	async fn put(&self, key: &str, data: Bytes) -> Result<(), BlobError> {
		validate_key(key)?;
		self.blobs.write().await.insert(key.to_string(), data);
		Ok(())
	}

	async fn get(&self, key: &str) -> Result<Bytes, BlobError> {
		validate_key(key)?;
		self.blobs
			.read()
			.await
			.get(key)
			.cloned()
			.ok_or_else(|| BlobError::NotFound(key.to_string()))
	}

	async fn remove(&self, key: &str) -> Result<bool, BlobError> {
		validate_key(key)?;
		Ok(self.blobs.write().await.remove(key).is_some())
	}
}
