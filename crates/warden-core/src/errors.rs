//! Unified error system for warden
//!
//! Each effect family owns a narrow error enum. `WardenError` folds them
//! together for callers that cross several effect boundaries, such as the
//! event router.

use crate::effects::{ConfigError, ServerError, StorageError, TimeError};
use crate::identity::IdentityError;

/// Unified error type for all warden operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum WardenError {
    /// Key-value store failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Clock or timer failure
    #[error(transparent)]
    Time(#[from] TimeError),

    /// Game server surface failure
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Policy configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed player identity
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl WardenError {
    /// Whether the failure came from the external key-value store.
    ///
    /// The command layer uses this to tell a store outage apart from bad input.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Standard result type for warden operations
pub type WardenResult<T> = Result<T, WardenError>;
