//! Fault-injecting key-value wrapper.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use warden_core::{KeyValueEffects, StorageError, WriteBatch};
use warden_effects::MemoryKvHandler;

/// Key-value store that can be switched offline
///
/// Wraps a real handler so that successful operations keep full semantics.
pub struct FaultyStore {
    inner: Arc<dyn KeyValueEffects>,
    fail_reads: AtomicBool,
    fail_commits: AtomicBool,
    commits: AtomicUsize,
}

impl FaultyStore {
    /// Wrap an existing handler
    pub fn wrap(inner: Arc<dyn KeyValueEffects>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_commits: AtomicBool::new(false),
            commits: AtomicUsize::new(0),
        }
    }

    /// Wrap a fresh in-memory handler
    pub fn memory() -> Self {
        Self::wrap(Arc::new(MemoryKvHandler::new()))
    }

    /// Make reads fail until cleared
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make commits and single writes fail until cleared
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Successful commits so far
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn read_gate(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }

    fn write_gate(&self) -> Result<(), StorageError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueEffects for FaultyStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.read_gate()?;
        self.inner.exists(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read_gate()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.write_gate()?;
        self.inner.set(key, value).await
    }

    async fn list_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StorageError> {
        self.read_gate()?;
        self.inner.list_range(key, start, stop).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StorageError> {
        self.read_gate()?;
        self.inner.set_members(key).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StorageError> {
        self.write_gate()?;
        self.inner.commit(batch).await?;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
