//! Vote policy snapshot.
//!
//! Read from `PolicyEffects` on every vote call so configuration reloads take
//! effect on the next vote. Missing options disable the feature they control.
//! Malformed options are logged and treated as missing.

use serde::{Deserialize, Serialize};
use warden_core::{ConfigError, PolicyEffects};

/// Namespace holding the moderation options.
pub const POLICY_NAMESPACE: &str = "Essentials";

const AUTO_PASS: &str = "AutoPassMajorityVote";
const REQUIRE_PARTICIPATION: &str = "AutoPassRequireParticipation";
const MAXIMUM_TEAMSIZE: &str = "MaximumTeamsize";
const MINIMUM_TEAMSIZE: &str = "MinimumTeamsize";

/// Configured team size bounds. `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsizeLimits {
    /// Smallest allowed team size
    pub min: Option<i64>,
    /// Largest allowed team size
    pub max: Option<i64>,
}

impl TeamsizeLimits {
    /// Read the bounds from policy.
    pub fn from_policy(policy: &dyn PolicyEffects) -> Self {
        Self {
            min: lenient(policy.option_i64(POLICY_NAMESPACE, MINIMUM_TEAMSIZE)),
            max: lenient(policy.option_i64(POLICY_NAMESPACE, MAXIMUM_TEAMSIZE)),
        }
    }
}

/// Auto-pass settings plus team size bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VotePolicy {
    /// Force-pass votes that still hold a majority after the confirmation delay
    pub auto_pass: bool,
    /// Minimum share of the roster that must have voted, in `(0, 1]`
    pub participation: Option<f64>,
    /// Team size bounds enforced on teamsize votes
    pub teamsize: TeamsizeLimits,
}

impl VotePolicy {
    /// Read the full policy.
    pub fn from_policy(policy: &dyn PolicyEffects) -> Self {
        let auto_pass = lenient(policy.option_bool(POLICY_NAMESPACE, AUTO_PASS)).unwrap_or(false);
        let participation = lenient(policy.option_f64(POLICY_NAMESPACE, REQUIRE_PARTICIPATION))
            .and_then(clamp_participation);
        Self {
            auto_pass,
            participation,
            teamsize: TeamsizeLimits::from_policy(policy),
        }
    }
}

fn lenient<T>(value: Result<Option<T>, ConfigError>) -> Option<T> {
    value.unwrap_or_else(|error| {
        tracing::warn!(%error, "Ignoring malformed policy option");
        None
    })
}

/// A zero threshold is no requirement at all; values above one are capped.
fn clamp_participation(raw: f64) -> Option<f64> {
    if raw <= 0.0 {
        if raw < 0.0 {
            tracing::warn!(value = raw, "Participation requirement below 0, ignoring");
        }
        return None;
    }
    if raw > 1.0 {
        tracing::warn!(value = raw, "Participation requirement above 1, clamping");
        return Some(1.0);
    }
    Some(raw)
}
