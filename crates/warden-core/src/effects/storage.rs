//! Key-value storage effects.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `warden-effects`
//! - **Usage**: player history ledger
//!
//! The store is shared with other tools and does not enforce value types.
//! A key holds either a scalar string, an ordered list or a set; handlers
//! report [`StorageError::WrongType`] when an operation targets a key that
//! holds a different kind of value.
//!
//! Multi-key updates go through [`KeyValueEffects::commit`] with a
//! [`WriteBatch`]. A commit is all-or-nothing: if any operation in the batch
//! fails, none of them is visible afterwards.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error type for key-value operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StorageError {
    /// The backing store cannot be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// An operation targeted a key holding another kind of value.
    #[error("Wrong value type at key {key}: expected {expected}")]
    WrongType {
        /// Offending key
        key: String,
        /// Kind the operation required
        expected: &'static str,
    },
    /// Key is empty or otherwise unusable.
    #[error("Invalid key: {reason}")]
    InvalidKey {
        /// Reason the key was rejected
        reason: String,
    },
    /// A batch could not be applied.
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),
    /// Stored data could not be decoded.
    #[error("Corrupt value at key {key}: {reason}")]
    Corrupt {
        /// Offending key
        key: String,
        /// Decoding failure
        reason: String,
    },
}

/// A single staged write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOp {
    /// Overwrite a scalar value.
    Set {
        /// Target key
        key: String,
        /// New value
        value: String,
    },
    /// Push onto the head of a list, creating it if absent.
    ListPush {
        /// Target key
        key: String,
        /// Value to push
        value: String,
    },
    /// Keep only the inclusive `start..=stop` range of a list.
    ///
    /// Negative indices count from the tail (`-1` is the last element).
    ListTrim {
        /// Target key
        key: String,
        /// First kept index
        start: i64,
        /// Last kept index
        stop: i64,
    },
    /// Add a member to a set, creating it if absent.
    SetAdd {
        /// Target key
        key: String,
        /// Member to add
        member: String,
    },
}

impl WriteOp {
    /// Key this operation writes to.
    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. }
            | Self::ListPush { key, .. }
            | Self::ListTrim { key, .. }
            | Self::SetAdd { key, .. } => key,
        }
    }
}

/// Ordered batch of writes committed as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Start an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a scalar write.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Stage a list head push.
    pub fn list_push(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ops.push(WriteOp::ListPush {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Stage a list trim.
    pub fn list_trim(mut self, key: impl Into<String>, start: i64, stop: i64) -> Self {
        self.ops.push(WriteOp::ListTrim {
            key: key.into(),
            start,
            stop,
        });
        self
    }

    /// Stage a set insertion.
    pub fn set_add(mut self, key: impl Into<String>, member: impl Into<String>) -> Self {
        self.ops.push(WriteOp::SetAdd {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    /// Staged operations in commit order.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Number of staged operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

/// Key-value store operations.
#[async_trait]
pub trait KeyValueEffects: Send + Sync {
    /// Whether any value is stored at `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Read a scalar value.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a scalar value outside of a batch.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Read the inclusive `start..=stop` range of a list (negative indices
    /// count from the tail). A missing key reads as an empty list.
    async fn list_range(&self, key: &str, start: i64, stop: i64)
        -> Result<Vec<String>, StorageError>;

    /// Read every member of a set. A missing key reads as an empty set.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StorageError>;

    /// Apply every operation in `batch` atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StorageError>;
}

/// Blanket implementation for Arc<T> where T: KeyValueEffects
#[async_trait]
impl<T: KeyValueEffects + ?Sized> KeyValueEffects for Arc<T> {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        (**self).exists(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn list_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StorageError> {
        (**self).list_range(key, start, stop).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StorageError> {
        (**self).set_members(key).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StorageError> {
        (**self).commit(batch).await
    }
}

/// Resolve redis-style inclusive list bounds against a list of `len`
/// elements. Returns `None` when the range selects nothing.
pub fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}
