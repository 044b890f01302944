//! Key-value storage handlers.
//!
//! Both handlers share [`Keyspace`], a typed in-memory model of the store.
//! Batches are applied to a staging overlay of the touched keys and merged
//! back only after every operation succeeded, so a failed commit leaves the
//! keyspace untouched.

mod file;
mod memory;

pub use file::FileKvHandler;
pub use memory::MemoryKvHandler;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use warden_core::effects::storage::resolve_range;
use warden_core::{StorageError, WriteBatch, WriteOp};

/// A stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Scalar string
    Scalar(String),
    /// Ordered list, head first
    List(VecDeque<String>),
    /// Unordered unique members
    Set(BTreeSet<String>),
}

/// Typed in-memory keyspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyspace {
    entries: BTreeMap<String, Value>,
}

impl Keyspace {
    /// Empty keyspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn scalar(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Value::Scalar(v)) => Ok(Some(v.clone())),
            Some(_) => Err(wrong_type(key, "scalar")),
        }
    }

    pub(crate) fn list_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StorageError> {
        match self.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => Ok(match resolve_range(items.len(), start, stop) {
                Some((a, b)) => items.range(a..=b).cloned().collect(),
                None => Vec::new(),
            }),
            Some(_) => Err(wrong_type(key, "list")),
        }
    }

    pub(crate) fn set_members(&self, key: &str) -> Result<Vec<String>, StorageError> {
        match self.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key, "set")),
        }
    }

    pub(crate) fn put_scalar(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), Value::Scalar(value));
        Ok(())
    }

    /// Stage `batch` against the current contents.
    ///
    /// Returns the new values of every touched key without modifying `self`.
    /// Keys whose value became empty map to `None`.
    pub(crate) fn stage(&self, batch: WriteBatch) -> Result<Staged, StorageError> {
        let mut overlay: HashMap<String, Option<Value>> = HashMap::new();
        for op in batch {
            validate_key(op.key())?;
            let slot = overlay
                .entry(op.key().to_string())
                .or_insert_with(|| self.entries.get(op.key()).cloned());
            apply(slot, op)?;
        }
        Ok(Staged(overlay))
    }

    /// Merge a staged overlay back in.
    pub(crate) fn merge(&mut self, staged: Staged) {
        for (key, value) in staged.0 {
            match value {
                Some(value) => {
                    self.entries.insert(key, value);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }
}

/// Result of staging a batch; see [`Keyspace::stage`].
#[derive(Debug)]
pub(crate) struct Staged(HashMap<String, Option<Value>>);

fn apply(slot: &mut Option<Value>, op: WriteOp) -> Result<(), StorageError> {
    match op {
        WriteOp::Set { value, .. } => {
            *slot = Some(Value::Scalar(value));
        }
        WriteOp::ListPush { key, value } => match slot {
            None => *slot = Some(Value::List(VecDeque::from([value]))),
            Some(Value::List(items)) => items.push_front(value),
            Some(_) => return Err(wrong_type(&key, "list")),
        },
        WriteOp::ListTrim { key, start, stop } => match slot {
            None => {}
            Some(Value::List(items)) => {
                match resolve_range(items.len(), start, stop) {
                    Some((a, b)) => {
                        items.truncate(b + 1);
                        items.drain(..a);
                    }
                    None => items.clear(),
                }
                if items.is_empty() {
                    *slot = None;
                }
            }
            Some(_) => return Err(wrong_type(&key, "list")),
        },
        WriteOp::SetAdd { key, member } => match slot {
            None => *slot = Some(Value::Set(BTreeSet::from([member]))),
            Some(Value::Set(members)) => {
                members.insert(member);
            }
            Some(_) => return Err(wrong_type(&key, "set")),
        },
    }
    Ok(())
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey {
            reason: "Key cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn wrong_type(key: &str, expected: &'static str) -> StorageError {
    StorageError::WrongType {
        key: key.to_string(),
        expected,
    }
}
