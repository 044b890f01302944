//! Script execution against the in-process server model.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use warden_core::{
    ConfigError, KeyValueEffects, PolicyEffects, TimerEffects, VoteTally, WardenError,
    WardenResult,
};
use warden_effects::{InMemoryGameServer, SystemClockHandler};
use warden_moderation::{EventRouter, HookEvent, LastSeen, ModerationEffects};

use crate::script::{identity, Step};

/// Optional policy reload hook, set when the policy came from a file.
pub type Reloader = Box<dyn Fn() -> WardenResult<()> + Send + Sync>;

/// Replays script steps and reports one JSON outcome per step.
pub struct Replayer {
    router: EventRouter,
    server: Arc<InMemoryGameServer>,
    reload: Option<Reloader>,
}

impl Replayer {
    /// Wire a router over the given handlers and a fresh in-process server.
    pub fn new(
        store: Arc<dyn KeyValueEffects>,
        timer: Arc<dyn TimerEffects>,
        policy: Arc<dyn PolicyEffects>,
        reload: Option<Reloader>,
    ) -> Self {
        let server = Arc::new(InMemoryGameServer::new());
        let router = EventRouter::new(ModerationEffects {
            store,
            clock: Arc::new(SystemClockHandler::new()),
            timer,
            server: server.clone(),
            policy,
        });
        Self {
            router,
            server,
            reload,
        }
    }

    /// The in-process game server.
    pub fn server(&self) -> &InMemoryGameServer {
        &self.server
    }

    /// Run one step.
    pub async fn execute(&self, step: Step) -> WardenResult<Value> {
        match step {
            Step::Connect { player, name } => {
                let player = identity(&player)?;
                self.router
                    .dispatch(HookEvent::PlayerConnect { player, name })
                    .await?;
                Ok(json!({ "aliases": self.router.aliases(player).await? }))
            }
            Step::Disconnect { player, name } => {
                let player = identity(&player)?;
                self.router
                    .dispatch(HookEvent::PlayerDisconnect { player, name })
                    .await?;
                self.server.leave(player);
                Ok(Value::Null)
            }
            Step::VoteCalled { kind, argument } => {
                let decision = self
                    .router
                    .dispatch(HookEvent::VoteCalled { kind, argument })
                    .await?;
                Ok(json!(decision))
            }
            Step::Command {
                actor,
                command,
                args,
            } => {
                self.router
                    .dispatch(HookEvent::Command {
                        actor,
                        command,
                        args,
                    })
                    .await?;
                Ok(Value::Null)
            }
            Step::Join { player, team } => {
                self.server.join(identity(&player)?, team);
                Ok(Value::Null)
            }
            Step::Leave { player } => Ok(json!({ "removed": self.server.leave(identity(&player)?) })),
            Step::VoteOpen => {
                self.server.open_vote();
                Ok(Value::Null)
            }
            Step::Tally { yes, no } => Ok(json!({
                "applied": self.server.set_tally(VoteTally::new(yes, no))
            })),
            Step::VoteClose => {
                self.server.close_vote();
                Ok(Value::Null)
            }
            Step::Force { pass } => Ok(json!(self.router.force_current(pass).await?)),
            Step::Recent => Ok(json!(self.router.audit_recent())),
            Step::Seen { player } => {
                let player = identity(&player)?;
                let seen = self.router.last_seen(player).await?;
                let elapsed = match seen {
                    LastSeen::Never => None,
                    LastSeen::At(_) => self.router.elapsed_since(player).await?,
                };
                Ok(json!({ "last_seen": seen, "elapsed": elapsed }))
            }
            Step::Aliases { player } => {
                Ok(json!(self.router.aliases(identity(&player)?).await?))
            }
            Step::Players => {
                let players = self.router.known_players().await?;
                Ok(json!(players))
            }
            Step::Limits => Ok(json!(self.router.teamsize_limits())),
            Step::Reload => match &self.reload {
                Some(reload) => {
                    reload()?;
                    Ok(json!({ "reloaded": true }))
                }
                None => Ok(json!({ "reloaded": false })),
            },
            Step::Sleep { secs } => {
                let delay = Duration::try_from_secs_f64(secs).map_err(|_| {
                    WardenError::Config(ConfigError::InvalidValue {
                        namespace: "script".into(),
                        key: "secs".into(),
                        value: secs.to_string(),
                        expected: "non-negative number of seconds",
                    })
                })?;
                tokio::time::sleep(delay).await;
                Ok(json!({ "decisions": self.server.decisions() }))
            }
        }
    }
}
