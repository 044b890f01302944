//! In-memory key-value handler

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use warden_core::{KeyValueEffects, StorageError, WriteBatch};

use super::Keyspace;

/// In-memory key-value handler.
///
/// Commits take the write lock for the whole stage-and-merge, so readers see
/// either all of a batch or none of it.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvHandler {
    data: Arc<RwLock<Keyspace>>,
}

impl MemoryKvHandler {
    /// Create an empty handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial contents
    pub fn with_keyspace(keyspace: Keyspace) -> Self {
        Self {
            data: Arc::new(RwLock::new(keyspace)),
        }
    }

    /// Copy of the current contents (for inspection)
    pub async fn snapshot(&self) -> Keyspace {
        self.data.read().await.clone()
    }
}

#[async_trait]
impl KeyValueEffects for MemoryKvHandler {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.data.read().await.contains(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.data.read().await.scalar(key)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.data.write().await.put_scalar(key, value)
    }

    async fn list_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StorageError> {
        self.data.read().await.list_range(key, start, stop)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StorageError> {
        self.data.read().await.set_members(key)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        let staged = data.stage(batch)?;
        data.merge(staged);
        Ok(())
    }
}
