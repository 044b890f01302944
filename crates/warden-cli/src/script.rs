//! Replay script format.
//!
//! One JSON object per line, tagged by `op`. Blank lines and lines starting
//! with `#` are skipped. Player identities are given as strings and validated
//! the same way the host server's identities are.

use serde::Deserialize;
use warden_core::{PlayerId, Team, WardenResult};

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Player connect hook
    Connect { player: String, name: String },
    /// Player disconnect hook
    Disconnect { player: String, name: String },
    /// Vote-called hook
    VoteCalled {
        kind: String,
        #[serde(default)]
        argument: String,
    },
    /// Command hook
    Command {
        actor: String,
        command: String,
        #[serde(default)]
        args: String,
    },
    /// Put a player on a team
    Join { player: String, team: Team },
    /// Remove a player from the roster
    Leave { player: String },
    /// Open a vote on the game server
    VoteOpen,
    /// Set the tally of the open vote
    Tally { yes: u32, no: u32 },
    /// End the open vote without a decision
    VoteClose,
    /// Pass or veto the open vote
    Force { pass: bool },
    /// Recently dispatched commands
    Recent,
    /// Last-seen lookup
    Seen { player: String },
    /// Alias lookup
    Aliases { player: String },
    /// Every recorded identity
    Players,
    /// Team size bounds
    Limits,
    /// Reload the policy file
    Reload,
    /// Wait, letting scheduled confirmations fire
    Sleep { secs: f64 },
}

impl Step {
    /// Operation name, as written in the script.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Disconnect { .. } => "disconnect",
            Self::VoteCalled { .. } => "vote_called",
            Self::Command { .. } => "command",
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::VoteOpen => "vote_open",
            Self::Tally { .. } => "tally",
            Self::VoteClose => "vote_close",
            Self::Force { .. } => "force",
            Self::Recent => "recent",
            Self::Seen { .. } => "seen",
            Self::Aliases { .. } => "aliases",
            Self::Players => "players",
            Self::Limits => "limits",
            Self::Reload => "reload",
            Self::Sleep { .. } => "sleep",
        }
    }
}

/// Parse one script line. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> serde_json::Result<Option<Step>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Validate a script identity.
pub fn identity(raw: &str) -> WardenResult<PlayerId> {
    Ok(raw.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# setup").unwrap(), None);
    }

    #[test]
    fn parses_tagged_steps() {
        let step = parse_line(r#"{"op":"vote_called","kind":"teamsize","argument":"4"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(step.name(), "vote_called");

        let step = parse_line(r#"{"op":"join","player":"76561198000000001","team":"red"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            step,
            Step::Join {
                player: "76561198000000001".into(),
                team: Team::Red
            }
        );
        assert_eq!(parse_line(r#"{"op":"vote_open"}"#).unwrap(), Some(Step::VoteOpen));
    }

    #[test]
    fn rejects_unknown_ops() {
        assert!(parse_line(r#"{"op":"ban","player":"1"}"#).is_err());
    }

    #[test]
    fn identity_validation() {
        assert!(identity("76561198000000001").is_ok());
        assert!(identity("12").is_err());
        assert!(identity("Mino").is_err());
    }
}
