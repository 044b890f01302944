//! File-backed key-value handler

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use warden_core::{KeyValueEffects, StorageError, WriteBatch};

use super::Keyspace;

/// Key-value handler persisted as a JSON snapshot.
///
/// The whole keyspace is held in memory and rewritten after every successful
/// write. The snapshot goes to a sibling temp file first and is then renamed
/// over the target, so a crash mid-write leaves the previous snapshot intact.
/// The in-memory copy is only updated once the rename succeeded.
#[derive(Debug, Clone)]
pub struct FileKvHandler {
    path: PathBuf,
    data: Arc<Mutex<Keyspace>>,
}

impl FileKvHandler {
    /// Open the snapshot at `path`, starting empty if it does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let keyspace = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
                key: path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Keyspace::new(),
            Err(e) => {
                return Err(StorageError::Unavailable(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        tracing::debug!(path = %path.display(), keys = keyspace.len(), "Opened key-value snapshot");
        Ok(Self {
            path,
            data: Arc::new(Mutex::new(keyspace)),
        })
    }

    /// Snapshot location
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, keyspace: &Keyspace) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(keyspace)
            .map_err(|e| StorageError::TransactionAborted(format!("Failed to encode: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::Unavailable(format!("Failed to create directory: {e}"))
            })?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)
            .await
            .map_err(|e| StorageError::Unavailable(format!("Failed to write snapshot: {e}")))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Unavailable(format!("Failed to replace snapshot: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueEffects for FileKvHandler {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.data.lock().await.contains(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.data.lock().await.scalar(key)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.commit(WriteBatch::new().set(key, value)).await
    }

    async fn list_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StorageError> {
        self.data.lock().await.list_range(key, start, stop)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StorageError> {
        self.data.lock().await.set_members(key)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let mut data = self.data.lock().await;
        let staged = data.stage(batch)?;
        let mut next = data.clone();
        next.merge(staged);
        self.persist(&next).await?;
        *data = next;
        Ok(())
    }
}
