//! Game server effects.
//!
//! # Effect Classification
//!
//! - **Category**: Host Effect
//! - **Implementation**: provided by the host game server; `warden-effects`
//!   ships an in-process model and `warden-testkit` a scriptable mock
//! - **Usage**: vote arbitration (roster size, tally, forced decisions)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::identity::PlayerId;

/// Error type for game server queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ServerError {
    /// The server did not answer.
    #[error("Game server unavailable: {0}")]
    Unavailable(String),
    /// The server answered with something unusable.
    #[error("Unexpected game server state: {0}")]
    UnexpectedState(String),
}

/// Team a connected player belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Unassigned (free-for-all modes)
    Free,
    /// Red team
    Red,
    /// Blue team
    Blue,
    /// Watching, not playing
    Spectator,
}

impl Team {
    /// Whether members of this team count towards vote participation.
    pub fn participates(self) -> bool {
        !matches!(self, Self::Spectator)
    }
}

/// Current team membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    teams: BTreeMap<Team, Vec<PlayerId>>,
}

impl Roster {
    /// Empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player to `team`, removing it from any other team first.
    pub fn assign(&mut self, player: PlayerId, team: Team) {
        self.remove(player);
        self.teams.entry(team).or_default().push(player);
    }

    /// Builder form of [`Roster::assign`].
    pub fn with(mut self, player: PlayerId, team: Team) -> Self {
        self.assign(player, team);
        self
    }

    /// Remove a player from whatever team it is on.
    pub fn remove(&mut self, player: PlayerId) -> bool {
        let mut removed = false;
        for members in self.teams.values_mut() {
            let before = members.len();
            members.retain(|p| *p != player);
            removed |= members.len() != before;
        }
        removed
    }

    /// Members of one team.
    pub fn team(&self, team: Team) -> &[PlayerId] {
        self.teams.get(&team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Team a player is on, if connected.
    pub fn team_of(&self, player: PlayerId) -> Option<Team> {
        self.teams
            .iter()
            .find(|(_, members)| members.contains(&player))
            .map(|(team, _)| *team)
    }

    /// Sum of the free, red and blue rosters; the participation denominator.
    pub fn participant_count(&self) -> usize {
        self.teams
            .iter()
            .filter(|(team, _)| team.participates())
            .map(|(_, members)| members.len())
            .sum()
    }

    /// Every connected player, spectators included.
    pub fn len(&self) -> usize {
        self.teams.values().map(Vec::len).sum()
    }

    /// Whether nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Votes cast on the active vote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Yes votes
    pub yes: u32,
    /// No votes
    pub no: u32,
}

impl VoteTally {
    /// Construct a tally.
    pub const fn new(yes: u32, no: u32) -> Self {
        Self { yes, no }
    }

    /// Votes cast either way.
    pub fn cast(&self) -> u64 {
        u64::from(self.yes) + u64::from(self.no)
    }

    /// Strict majority in favour.
    pub fn has_majority(&self) -> bool {
        self.yes > self.no
    }
}

/// Roster queries.
#[async_trait]
pub trait RosterEffects: Send + Sync {
    /// Current team membership.
    async fn roster(&self) -> Result<Roster, ServerError>;
}

/// Vote state queries.
#[async_trait]
pub trait VoteStateEffects: Send + Sync {
    /// Whether a vote is in progress.
    async fn is_vote_active(&self) -> Result<bool, ServerError>;

    /// Tally of the vote in progress, `None` when no vote is active.
    async fn current_tally(&self) -> Result<Option<VoteTally>, ServerError>;
}

/// Forced vote decisions.
#[async_trait]
pub trait VoteControlEffects: Send + Sync {
    /// Pass (`true`) or veto (`false`) the active vote.
    ///
    /// Implementations must treat a call with no active vote as a no-op.
    async fn force_vote(&self, pass: bool) -> Result<(), ServerError>;
}

/// Blanket implementation for Arc<T> where T: RosterEffects
#[async_trait]
impl<T: RosterEffects + ?Sized> RosterEffects for Arc<T> {
    async fn roster(&self) -> Result<Roster, ServerError> {
        (**self).roster().await
    }
}

/// Blanket implementation for Arc<T> where T: VoteStateEffects
#[async_trait]
impl<T: VoteStateEffects + ?Sized> VoteStateEffects for Arc<T> {
    async fn is_vote_active(&self) -> Result<bool, ServerError> {
        (**self).is_vote_active().await
    }

    async fn current_tally(&self) -> Result<Option<VoteTally>, ServerError> {
        (**self).current_tally().await
    }
}

/// Blanket implementation for Arc<T> where T: VoteControlEffects
#[async_trait]
impl<T: VoteControlEffects + ?Sized> VoteControlEffects for Arc<T> {
    async fn force_vote(&self, pass: bool) -> Result<(), ServerError> {
        (**self).force_vote(pass).await
    }
}
