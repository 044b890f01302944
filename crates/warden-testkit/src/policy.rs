//! In-memory policy options with a builder for the moderation namespace.

use parking_lot::RwLock;
use std::collections::HashMap;
use warden_core::PolicyEffects;
use warden_moderation::POLICY_NAMESPACE;

/// Policy options set directly by the test
#[derive(Debug, Default)]
pub struct StaticPolicy {
    options: RwLock<HashMap<(String, String), String>>,
}

impl StaticPolicy {
    /// No options set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set any option
    pub fn with(self, namespace: &str, key: &str, value: impl ToString) -> Self {
        self.set(namespace, key, value);
        self
    }

    /// Set or replace an option in place
    pub fn set(&self, namespace: &str, key: &str, value: impl ToString) {
        self.options
            .write()
            .insert((namespace.to_string(), key.to_string()), value.to_string());
    }

    /// Remove an option in place
    pub fn unset(&self, namespace: &str, key: &str) {
        self.options
            .write()
            .remove(&(namespace.to_string(), key.to_string()));
    }

    /// `AutoPassMajorityVote`
    pub fn auto_pass(self, enabled: bool) -> Self {
        self.with(POLICY_NAMESPACE, "AutoPassMajorityVote", enabled)
    }

    /// `AutoPassRequireParticipation`
    pub fn participation(self, ratio: f64) -> Self {
        self.with(POLICY_NAMESPACE, "AutoPassRequireParticipation", ratio)
    }

    /// `MaximumTeamsize`
    pub fn max_teamsize(self, size: i64) -> Self {
        self.with(POLICY_NAMESPACE, "MaximumTeamsize", size)
    }

    /// `MinimumTeamsize`
    pub fn min_teamsize(self, size: i64) -> Self {
        self.with(POLICY_NAMESPACE, "MinimumTeamsize", size)
    }
}

impl PolicyEffects for StaticPolicy {
    fn option(&self, namespace: &str, key: &str) -> Option<String> {
        self.options
            .read()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }
}
