//! Event routing tests

use std::sync::Arc;
use warden_core::VoteTally;
use warden_effects::{InMemoryGameServer, MemoryKvHandler, SystemClockHandler};
use warden_moderation::{
    AuditEntry, EventRouter, HookEvent, ModerationEffects, VoteDecision, AUDIT_CAPACITY,
};
use warden_testkit::{init_test_tracing, player, ManualTimer, ModerationHarness, StaticPolicy};

mod audit_tests {
    use super::*;

    #[tokio::test]
    async fn test_recent_excludes_current_command() {
        let harness = ModerationHarness::new(StaticPolicy::new());

        harness.command("Mino", "c1", "!c1").await;
        harness.command("Mino", "c2", "!c2 x").await;
        harness.command("Mino", "c3", "!c3").await;

        assert_eq!(
            harness.router.audit_recent(),
            vec![
                AuditEntry::new("Mino", "c2", "!c2 x"),
                AuditEntry::new("Mino", "c1", "!c1"),
            ]
        );
    }

    #[tokio::test]
    async fn test_audit_holds_capacity_entries() {
        let harness = ModerationHarness::new(StaticPolicy::new());
        for n in 0..30 {
            harness.router.audit_record("Mino", &format!("c{n}"), "");
        }

        let recent = harness.router.audit_recent();
        assert_eq!(recent.len(), AUDIT_CAPACITY - 1);
        assert_eq!(recent[0].command, "c28");
    }

    #[tokio::test]
    async fn test_empty_audit() {
        let harness = ModerationHarness::new(StaticPolicy::new());
        assert!(harness.router.audit_recent().is_empty());
    }
}

mod dispatch_tests {
    use super::*;

    #[tokio::test]
    async fn test_hooks_deserialize_from_wire_form() {
        let event: HookEvent = serde_json::from_str(
            r#"{"hook":"vote_called","kind":"teamsize","argument":"6"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            HookEvent::VoteCalled {
                kind: "teamsize".into(),
                argument: "6".into()
            }
        );

        let event: HookEvent = serde_json::from_str(
            r#"{"hook":"player_connect","player":76561198000000001,"name":"Mino"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            HookEvent::PlayerConnect {
                player: player(1),
                name: "Mino".into()
            }
        );
    }

    #[tokio::test]
    async fn test_router_over_production_handlers() {
        init_test_tracing();
        let server = Arc::new(InMemoryGameServer::new());
        let timer = Arc::new(ManualTimer::new());
        let router = EventRouter::new(ModerationEffects {
            store: Arc::new(MemoryKvHandler::new()),
            clock: Arc::new(SystemClockHandler::new()),
            timer: timer.clone(),
            server: server.clone(),
            policy: Arc::new(StaticPolicy::new().auto_pass(true)),
        });

        router
            .dispatch(HookEvent::PlayerConnect {
                player: player(1),
                name: "^2Mino".into(),
            })
            .await
            .unwrap();
        server.join(player(1), warden_core::Team::Red);
        server.open_vote();
        server.set_tally(VoteTally::new(1, 0));

        let decision = router
            .dispatch(HookEvent::VoteCalled {
                kind: "map".into(),
                argument: "campgrounds".into(),
            })
            .await
            .unwrap();
        assert_eq!(decision, VoteDecision::Continue);
        assert_eq!(timer.fire_all().await, 1);

        assert_eq!(server.decisions(), vec![true]);
        assert_eq!(router.aliases(player(1)).await.unwrap(), vec!["Mino"]);
        assert!(router.last_seen(player(1)).await.unwrap().at().is_some());
    }
}
