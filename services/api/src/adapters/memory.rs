//! services/api/src/adapters/memory.rs
//!
//! Process-local implementation of the `BlobStore` port. Used when no database
//! is configured and by the integration tests. Contents are lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use study_core::ports::{BlobStore, PortError, PortResult};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs. Tests use this to check what was written.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> PortResult<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Blob {} not found", key)))
    }

    async fn put(&self, key: &str, body: Vec<u8>, _content_type: &str) -> PortResult<()> {
        self.blobs.write().await.insert(key.to_string(), body);
        Ok(())
    }
}
