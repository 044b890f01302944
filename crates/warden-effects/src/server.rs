//! In-process game server model
//!
//! Holds roster and vote state for hosts that drive warden from an event feed
//! instead of a live server (the replay binary, embedding tests). Forced
//! decisions close the active vote and are recorded in order.

use async_trait::async_trait;
use parking_lot::Mutex;
use warden_core::{
    PlayerId, Roster, RosterEffects, ServerError, Team, VoteControlEffects, VoteStateEffects,
    VoteTally,
};

#[derive(Debug, Default)]
struct ServerState {
    roster: Roster,
    vote: Option<VoteTally>,
    decisions: Vec<bool>,
}

/// Game server state held in process
#[derive(Debug, Default)]
pub struct InMemoryGameServer {
    state: Mutex<ServerState>,
}

impl InMemoryGameServer {
    /// Create an empty server
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a player on a team
    pub fn join(&self, player: PlayerId, team: Team) {
        self.state.lock().roster.assign(player, team);
    }

    /// Remove a player from the roster
    pub fn leave(&self, player: PlayerId) -> bool {
        self.state.lock().roster.remove(player)
    }

    /// Open a vote with an empty tally, replacing any vote in progress
    pub fn open_vote(&self) {
        self.state.lock().vote = Some(VoteTally::default());
    }

    /// Overwrite the tally of the vote in progress. Ignored with no active vote.
    pub fn set_tally(&self, tally: VoteTally) -> bool {
        match self.state.lock().vote.as_mut() {
            Some(current) => {
                *current = tally;
                true
            }
            None => false,
        }
    }

    /// End the vote in progress without a forced decision
    pub fn close_vote(&self) {
        self.state.lock().vote = None;
    }

    /// Forced decisions issued so far, oldest first
    pub fn decisions(&self) -> Vec<bool> {
        self.state.lock().decisions.clone()
    }
}

#[async_trait]
impl RosterEffects for InMemoryGameServer {
    async fn roster(&self) -> Result<Roster, ServerError> {
        Ok(self.state.lock().roster.clone())
    }
}

#[async_trait]
impl VoteStateEffects for InMemoryGameServer {
    async fn is_vote_active(&self) -> Result<bool, ServerError> {
        Ok(self.state.lock().vote.is_some())
    }

    async fn current_tally(&self) -> Result<Option<VoteTally>, ServerError> {
        Ok(self.state.lock().vote)
    }
}

#[async_trait]
impl VoteControlEffects for InMemoryGameServer {
    async fn force_vote(&self, pass: bool) -> Result<(), ServerError> {
        let mut state = self.state.lock();
        if state.vote.take().is_some() {
            state.decisions.push(pass);
        }
        Ok(())
    }
}
