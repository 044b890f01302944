//! Scriptable game server.
//!
//! Tests set the roster and tally directly and inspect every forced decision,
//! including the ones that were no-ops because no vote was active.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use warden_core::{
    PlayerId, Roster, RosterEffects, ServerError, Team, VoteControlEffects, VoteStateEffects,
    VoteTally,
};

#[derive(Debug, Default)]
struct MockState {
    roster: Roster,
    vote: Option<VoteTally>,
    decisions: Vec<bool>,
    force_calls: usize,
}

/// Mock game server for testing
#[derive(Debug, Default)]
pub struct MockGameServer {
    state: Mutex<MockState>,
    unavailable: AtomicBool,
    next_id: Mutex<u64>,
}

impl MockGameServer {
    /// Server with nobody connected and no vote
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `team` with `count` fresh players
    pub fn populate(&self, team: Team, count: usize) {
        let mut state = self.state.lock();
        let mut next_id = self.next_id.lock();
        for _ in 0..count {
            *next_id += 1;
            state
                .roster
                .assign(PlayerId::new(76_561_198_000_000_000 + *next_id), team);
        }
    }

    /// Replace the roster
    pub fn set_roster(&self, roster: Roster) {
        self.state.lock().roster = roster;
    }

    /// Start a vote with the given tally, or end it with `None`
    pub fn set_vote(&self, tally: Option<VoteTally>) {
        self.state.lock().vote = tally;
    }

    /// Make every query fail until cleared
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Decisions that reached an active vote, oldest first
    pub fn decisions(&self) -> Vec<bool> {
        self.state.lock().decisions.clone()
    }

    /// Number of `force_vote` calls, no-ops included
    pub fn force_calls(&self) -> usize {
        self.state.lock().force_calls
    }

    fn check(&self) -> Result<(), ServerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ServerError::Unavailable("mock server offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RosterEffects for MockGameServer {
    async fn roster(&self) -> Result<Roster, ServerError> {
        self.check()?;
        Ok(self.state.lock().roster.clone())
    }
}

#[async_trait]
impl VoteStateEffects for MockGameServer {
    async fn is_vote_active(&self) -> Result<bool, ServerError> {
        self.check()?;
        Ok(self.state.lock().vote.is_some())
    }

    async fn current_tally(&self) -> Result<Option<VoteTally>, ServerError> {
        self.check()?;
        Ok(self.state.lock().vote)
    }
}

#[async_trait]
impl VoteControlEffects for MockGameServer {
    async fn force_vote(&self, pass: bool) -> Result<(), ServerError> {
        self.check()?;
        let mut state = self.state.lock();
        state.force_calls += 1;
        if state.vote.take().is_some() {
            state.decisions.push(pass);
        }
        Ok(())
    }
}
