//! Recently dispatched commands.
//!
//! # Invariants
//!
//! - At most [`AUDIT_CAPACITY`] entries are held; recording into a full log
//!   evicts the oldest entry
//! - Entries are kept newest first
//! - The newest entry is the command currently being handled (usually the
//!   introspection command itself) and is never reported by [`AuditLog::recent`]

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Entries retained, including the one currently being handled.
pub const AUDIT_CAPACITY: usize = 11;

/// One dispatched command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Display name of whoever issued the command
    pub actor: String,
    /// Command name as dispatched
    pub command: String,
    /// Raw argument text
    pub raw_args: String,
}

impl AuditEntry {
    /// Construct an entry.
    pub fn new(
        actor: impl Into<String>,
        command: impl Into<String>,
        raw_args: impl Into<String>,
    ) -> Self {
        Self {
            actor: actor.into(),
            command: command.into(),
            raw_args: raw_args.into(),
        }
    }
}

/// Fixed-capacity, newest-first command log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
}

impl AuditLog {
    /// Empty log.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(AUDIT_CAPACITY),
        }
    }

    /// Record a command as the newest entry.
    pub fn record(&mut self, entry: AuditEntry) {
        if self.entries.len() == AUDIT_CAPACITY {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// Every entry except the newest, newest first.
    ///
    /// Empty when fewer than two commands have been recorded.
    pub fn recent(&self) -> Vec<AuditEntry> {
        self.entries.iter().skip(1).cloned().collect()
    }

    /// Number of entries held, the newest included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
