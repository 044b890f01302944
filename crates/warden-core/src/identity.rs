//! Player identity.
//!
//! Identities are 64-bit platform account numbers. They are independent of the
//! display name and stable across sessions. Values below 64 are never issued by
//! the platform, so they are rejected as invalid rather than unknown.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest identity the platform issues.
pub const MIN_PLAYER_ID: u64 = 64;

/// Errors from parsing a textual identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Input is not an unsigned integer.
    #[error("Unintelligible player identity: {0:?}")]
    Unintelligible(String),
    /// Input is numeric but outside the issued range.
    #[error("Invalid player identity: {0}")]
    Invalid(u64),
}

/// Stable player identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u64);

impl PlayerId {
    /// Wrap a raw identity without range checks.
    ///
    /// Hook events come from the game server and are trusted; user-typed
    /// identities should go through [`FromStr`].
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for PlayerId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s
            .trim()
            .parse()
            .map_err(|_| IdentityError::Unintelligible(s.to_string()))?;
        if raw < MIN_PLAYER_ID {
            return Err(IdentityError::Invalid(raw));
        }
        Ok(Self(raw))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PlayerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
