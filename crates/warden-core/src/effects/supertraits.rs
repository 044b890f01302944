//! Supertraits for common effect combinations

use super::{RosterEffects, VoteControlEffects, VoteStateEffects};

/// Supertrait for the full game server surface used by vote arbitration
///
/// Combines roster queries, vote state queries and forced decisions.
pub trait GameServerEffects: RosterEffects + VoteStateEffects + VoteControlEffects {}

/// Automatic implementation for types that satisfy the required bounds
impl<T> GameServerEffects for T where T: RosterEffects + VoteStateEffects + VoteControlEffects {}
