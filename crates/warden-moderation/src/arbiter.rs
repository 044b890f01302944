//! Vote arbitration.
//!
//! Every vote call bumps a generation counter when auto-pass is enabled and
//! schedules a [`ScheduledConfirmation`] carrying that generation. When the
//! confirmation fires it acts only if its generation is still the latest one,
//! so a timer left over from a superseded vote can never decide a later vote.
//! Timers are never cancelled; the generation check is the only supersession
//! mechanism.
//!
//! # Thread Safety
//!
//! Arbiter state sits behind a `tokio::sync::Mutex` that is held for the whole
//! of each operation, including the game server queries made while resolving a
//! confirmation. Vote calls, forced decisions and confirmations are therefore
//! fully serialized with respect to each other.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use warden_core::{
    GameServerEffects, PolicyEffects, ServerError, TimeError, TimerEffects, VoteTally,
};

use crate::policy::{TeamsizeLimits, VotePolicy};

/// Time a vote is left to mature before auto-pass is considered.
pub const CONFIRMATION_DELAY: Duration = Duration::from_secs(29);

const TEAMSIZE_VOTE: &str = "teamsize";

/// Snapshot taken when a confirmation is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledConfirmation {
    /// Generation of the vote this confirmation belongs to
    pub generation: u64,
    /// Required participation ratio, if any
    pub threshold: Option<f64>,
}

/// Why a vote call was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum VetoReason {
    /// Requested team size exceeds `MaximumTeamsize`
    TeamsizeAboveMaximum {
        /// Size the vote asked for
        requested: i64,
        /// Configured bound
        max: i64,
    },
    /// Requested team size is below `MinimumTeamsize`
    TeamsizeBelowMinimum {
        /// Size the vote asked for
        requested: i64,
        /// Configured bound
        min: i64,
    },
}

/// What the host server should do with a vote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum VoteDecision {
    /// Let the vote proceed
    Continue,
    /// Stop the vote and every later handler
    Veto(VetoReason),
}

/// Outcome of a fired confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// A newer vote was called after this confirmation was scheduled
    Stale {
        /// Generation the confirmation carried
        captured: u64,
        /// Latest generation at fire time
        current: Option<u64>,
    },
    /// The vote already ended
    NoActiveVote,
    /// Yes votes do not outnumber no votes
    NoMajority {
        /// Tally at fire time
        tally: VoteTally,
    },
    /// Too little of the roster voted
    InsufficientParticipation {
        /// Tally at fire time
        tally: VoteTally,
        /// Votes cast over participating roster size
        ratio: f64,
        /// Required ratio
        threshold: f64,
    },
    /// The vote was force-passed
    Passed {
        /// Tally at fire time
        tally: VoteTally,
    },
}

impl Resolution {
    /// Whether a force-pass was issued.
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

/// Outcome of an explicit pass/veto request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceOutcome {
    /// The decision was sent to the server
    Forced,
    /// There was nothing to decide
    NoActiveVote,
}

#[derive(Debug, Default)]
struct ArbiterState {
    generation: u64,
    last_vote: Option<u64>,
}

struct ArbiterInner {
    server: Arc<dyn GameServerEffects>,
    policy: Arc<dyn PolicyEffects>,
    timer: Arc<dyn TimerEffects>,
    state: Mutex<ArbiterState>,
}

/// Tracks the vote in flight and force-passes it under policy.
#[derive(Clone)]
pub struct VoteArbiter {
    inner: Arc<ArbiterInner>,
}

impl VoteArbiter {
    /// Create an arbiter with no tracked vote.
    pub fn new(
        server: Arc<dyn GameServerEffects>,
        policy: Arc<dyn PolicyEffects>,
        timer: Arc<dyn TimerEffects>,
    ) -> Self {
        Self {
            inner: Arc::new(ArbiterInner {
                server,
                policy,
                timer,
                state: Mutex::new(ArbiterState::default()),
            }),
        }
    }

    /// React to a vote being called.
    ///
    /// Teamsize votes outside the configured bounds are vetoed. A teamsize
    /// vote whose argument is not an integer is ignored entirely. Otherwise,
    /// with auto-pass enabled, the vote becomes the tracked vote and a
    /// confirmation is scheduled [`CONFIRMATION_DELAY`] from now.
    pub async fn on_vote_called(
        &self,
        kind: &str,
        argument: &str,
    ) -> Result<VoteDecision, TimeError> {
        let mut state = self.inner.state.lock().await;
        let policy = VotePolicy::from_policy(self.inner.policy.as_ref());

        if kind.eq_ignore_ascii_case(TEAMSIZE_VOTE) {
            let Ok(requested) = argument.trim().parse::<i64>() else {
                tracing::debug!(argument, "Ignoring teamsize vote with non-numeric size");
                return Ok(VoteDecision::Continue);
            };
            if let Some(reason) = check_teamsize(policy.teamsize, requested) {
                tracing::info!(requested, ?reason, "Vetoed teamsize vote");
                return Ok(VoteDecision::Veto(reason));
            }
        }

        if !policy.auto_pass {
            return Ok(VoteDecision::Continue);
        }

        state.generation += 1;
        state.last_vote = Some(state.generation);
        let confirmation = ScheduledConfirmation {
            generation: state.generation,
            threshold: policy.participation,
        };

        let inner = Arc::clone(&self.inner);
        let timer = self.inner.timer.schedule_once(
            CONFIRMATION_DELAY,
            Box::pin(async move {
                match inner.resolve(confirmation).await {
                    Ok(resolution) => tracing::debug!(
                        generation = confirmation.generation,
                        ?resolution,
                        "Confirmation fired"
                    ),
                    Err(error) => tracing::warn!(
                        generation = confirmation.generation,
                        %error,
                        "Confirmation failed"
                    ),
                }
            }),
        )?;
        tracing::debug!(
            generation = confirmation.generation,
            threshold = ?confirmation.threshold,
            %timer,
            "Scheduled vote confirmation"
        );
        Ok(VoteDecision::Continue)
    }

    /// Evaluate a confirmation now.
    ///
    /// This is what the scheduled timer runs; it is public so hosts with their
    /// own scheduling can drive it directly.
    pub async fn resolve(
        &self,
        confirmation: ScheduledConfirmation,
    ) -> Result<Resolution, ServerError> {
        self.inner.resolve(confirmation).await
    }

    /// Pass or veto the vote in progress, if any.
    ///
    /// Does not touch the generation counter; a pending confirmation for the
    /// same vote will find it no longer active.
    pub async fn force_current(&self, pass: bool) -> Result<ForceOutcome, ServerError> {
        let _state = self.inner.state.lock().await;
        if !self.inner.server.is_vote_active().await? {
            return Ok(ForceOutcome::NoActiveVote);
        }
        self.inner.server.force_vote(pass).await?;
        tracing::info!(pass, "Forced vote decision");
        Ok(ForceOutcome::Forced)
    }

    /// Configured team size bounds.
    pub fn teamsize_limits(&self) -> TeamsizeLimits {
        TeamsizeLimits::from_policy(self.inner.policy.as_ref())
    }

    /// Latest generation handed out; zero before the first tracked vote.
    pub async fn generation(&self) -> u64 {
        self.inner.state.lock().await.generation
    }

    /// Generation of the tracked vote, `None` before the first one.
    pub async fn last_vote(&self) -> Option<u64> {
        self.inner.state.lock().await.last_vote
    }
}

impl ArbiterInner {
    async fn resolve(&self, confirmation: ScheduledConfirmation) -> Result<Resolution, ServerError> {
        let state = self.state.lock().await;
        if state.last_vote != Some(confirmation.generation) {
            return Ok(Resolution::Stale {
                captured: confirmation.generation,
                current: state.last_vote,
            });
        }

        if !self.server.is_vote_active().await? {
            return Ok(Resolution::NoActiveVote);
        }
        let Some(tally) = self.server.current_tally().await? else {
            return Ok(Resolution::NoActiveVote);
        };
        if !tally.has_majority() {
            return Ok(Resolution::NoMajority { tally });
        }

        if let Some(threshold) = confirmation.threshold {
            let participants = self.server.roster().await?.participant_count();
            let ratio = if participants == 0 {
                0.0
            } else {
                tally.cast() as f64 / participants as f64
            };
            if ratio < threshold {
                return Ok(Resolution::InsufficientParticipation {
                    tally,
                    ratio,
                    threshold,
                });
            }
        }

        self.server.force_vote(true).await?;
        tracing::info!(
            generation = confirmation.generation,
            yes = tally.yes,
            no = tally.no,
            "Auto-passed majority vote"
        );
        Ok(Resolution::Passed { tally })
    }
}

fn check_teamsize(limits: TeamsizeLimits, requested: i64) -> Option<VetoReason> {
    if let Some(max) = limits.max.filter(|max| requested > *max) {
        return Some(VetoReason::TeamsizeAboveMaximum { requested, max });
    }
    if let Some(min) = limits.min.filter(|min| requested < *min) {
        return Some(VetoReason::TeamsizeBelowMinimum { requested, min });
    }
    None
}
