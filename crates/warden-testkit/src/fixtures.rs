//! Test fixtures and harness.

use std::sync::{Arc, Once};
use std::time::Duration;
use warden_core::{PlayerId, Team, VoteTally};
use warden_moderation::{EventRouter, HookEvent, ModerationEffects, VoteDecision, CONFIRMATION_DELAY};

use crate::clock::ControllableClock;
use crate::policy::StaticPolicy;
use crate::server::MockGameServer;
use crate::storage::FaultyStore;
use crate::timer::ManualTimer;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness' captured writer.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A valid player identity, offset into the range real identities use.
pub fn player(n: u64) -> PlayerId {
    PlayerId::new(76_561_198_000_000_000 + n)
}

/// An [`EventRouter`] wired to deterministic doubles.
///
/// Every double is reachable from the test so state can be scripted and
/// inspected while the router runs against it.
pub struct ModerationHarness {
    /// Router under test
    pub router: Arc<EventRouter>,
    /// Confirmation timer
    pub timer: Arc<ManualTimer>,
    /// Last-seen clock
    pub clock: Arc<ControllableClock>,
    /// Scripted game server
    pub server: Arc<MockGameServer>,
    /// History store
    pub store: Arc<FaultyStore>,
    /// Live policy options
    pub policy: Arc<StaticPolicy>,
}

impl ModerationHarness {
    /// Wire a router over fresh doubles and the given policy.
    pub fn new(policy: StaticPolicy) -> Self {
        init_test_tracing();
        let timer = Arc::new(ManualTimer::new());
        let clock = Arc::new(ControllableClock::fixed());
        let server = Arc::new(MockGameServer::new());
        let store = Arc::new(FaultyStore::memory());
        let policy = Arc::new(policy);

        let router = Arc::new(EventRouter::new(ModerationEffects {
            store: store.clone(),
            clock: clock.clone(),
            timer: timer.clone(),
            server: server.clone(),
            policy: policy.clone(),
        }));

        Self {
            router,
            timer,
            clock,
            server,
            store,
            policy,
        }
    }

    /// Dispatch a vote call and return the decision.
    pub async fn call_vote(&self, kind: &str, argument: &str) -> VoteDecision {
        self.router
            .dispatch(HookEvent::VoteCalled {
                kind: kind.to_string(),
                argument: argument.to_string(),
            })
            .await
            .expect("vote call failed")
    }

    /// Dispatch a connect hook.
    pub async fn connect(&self, who: PlayerId, name: &str) {
        self.router
            .dispatch(HookEvent::PlayerConnect {
                player: who,
                name: name.to_string(),
            })
            .await
            .expect("connect failed");
    }

    /// Dispatch a command hook.
    pub async fn command(&self, actor: &str, command: &str, args: &str) {
        self.router
            .dispatch(HookEvent::Command {
                actor: actor.to_string(),
                command: command.to_string(),
                args: args.to_string(),
            })
            .await
            .expect("command failed");
    }

    /// Put `participants` players on red and open a vote with `tally`.
    pub fn open_vote(&self, participants: usize, tally: VoteTally) {
        self.server.populate(Team::Red, participants);
        self.server.set_vote(Some(tally));
    }

    /// Let the confirmation delay elapse. Returns the number of timers fired.
    pub async fn wait_confirmation(&self) -> usize {
        self.timer.advance(CONFIRMATION_DELAY).await
    }

    /// Advance virtual time without reaching the confirmation delay.
    pub async fn wait_short_of_confirmation(&self) -> usize {
        self.timer
            .advance(CONFIRMATION_DELAY - Duration::from_secs(1))
            .await
    }
}
