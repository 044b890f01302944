//! Player history tests
//!
//! Alias tracking and last-seen bookkeeping through the event router, checked
//! against the raw store layout as well as the query surface.

use chrono::Duration;
use proptest::prelude::*;
use std::sync::Arc;
use warden_core::{Elapsed, KeyValueEffects, StorageError, WriteBatch};
use warden_effects::MemoryKvHandler;
use warden_moderation::{HistoryStore, LastSeen, PresenceUpdate, ALIAS_CAPACITY};
use warden_testkit::{player, ControllableClock, ModerationHarness, StaticPolicy};

fn harness() -> ModerationHarness {
    ModerationHarness::new(StaticPolicy::new())
}

/// Alias list maintenance
mod alias_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_sighting_creates_record() {
        let harness = harness();
        let mino = player(1);

        let update = harness.router.record_presence(mino, "^1Mino^7").await.unwrap();
        assert_eq!(update, PresenceUpdate::Created);

        assert_eq!(harness.router.aliases(mino).await.unwrap(), vec!["Mino"]);
        assert_eq!(harness.router.known_players().await.unwrap(), vec![mino]);
        assert_eq!(
            harness.router.last_seen(mino).await.unwrap(),
            LastSeen::At(harness.clock.current())
        );
    }

    #[tokio::test]
    async fn test_color_variants_are_one_alias() {
        let harness = harness();
        let mino = player(1);

        harness.connect(mino, "Mino").await;
        harness.clock.advance(Duration::minutes(10));
        harness.connect(mino, "Mino").await;
        assert_eq!(
            harness.router.last_seen(mino).await.unwrap().at(),
            Some(harness.clock.current())
        );

        harness.connect(mino, "^1Mino^7").await;
        assert_eq!(harness.router.aliases(mino).await.unwrap(), vec!["Mino"]);
    }

    #[tokio::test]
    async fn test_new_alias_goes_first() {
        let harness = harness();
        let mino = player(1);

        harness.connect(mino, "Mino").await;
        let update = harness.router.record_presence(mino, "^3Minotaur").await.unwrap();

        assert_eq!(update, PresenceUpdate::AliasAdded);
        assert_eq!(
            harness.router.aliases(mino).await.unwrap(),
            vec!["Minotaur", "Mino"]
        );
    }

    #[tokio::test]
    async fn test_aliases_truncated_to_capacity() {
        let harness = harness();
        let mino = player(1);

        for n in 0..=ALIAS_CAPACITY {
            harness.connect(mino, &format!("name{n}")).await;
        }

        let aliases = harness.router.aliases(mino).await.unwrap();
        assert_eq!(aliases.len(), ALIAS_CAPACITY);
        assert_eq!(aliases.first().map(String::as_str), Some("name20"));
        assert!(!aliases.iter().any(|a| a == "name0"));
    }

    #[tokio::test]
    async fn test_repeat_presence_is_idempotent() {
        let harness = harness();
        let mino = player(1);
        harness.connect(mino, "Mino").await;
        let before = harness.router.aliases(mino).await.unwrap();

        for _ in 0..5 {
            let update = harness.router.record_presence(mino, "Mino").await.unwrap();
            assert_eq!(update, PresenceUpdate::Refreshed);
        }

        assert_eq!(harness.router.aliases(mino).await.unwrap(), before);
        assert_eq!(harness.router.known_players().await.unwrap(), vec![mino]);
    }

    #[tokio::test]
    async fn test_stored_color_codes_still_match() {
        // Records written by older tools may hold colored names
        let store = Arc::new(MemoryKvHandler::new());
        let mino = player(1);
        let key = format!("minqlx:players:{mino}");
        store
            .commit(WriteBatch::new().list_push(&key, "^1Mino^7"))
            .await
            .unwrap();

        let history = HistoryStore::new(store.clone(), Arc::new(ControllableClock::fixed()));
        let update = history.record_presence(mino, "Mino").await.unwrap();

        assert_eq!(update, PresenceUpdate::Refreshed);
        assert_eq!(store.list_range(&key, 0, -1).await.unwrap(), vec!["^1Mino^7"]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_aliases_bounded_and_newest_first(
        names in prop::collection::vec("[a-e]{1,2}", 1..60)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let harness = harness();
            let mino = player(1);
            for name in &names {
                harness.connect(mino, name).await;
            }

            // Model: an unseen name goes to the head, then the tail is trimmed
            let mut expected: Vec<String> = Vec::new();
            for name in &names {
                if !expected.contains(name) {
                    expected.insert(0, name.clone());
                    expected.truncate(ALIAS_CAPACITY);
                }
            }

            let aliases = harness.router.aliases(mino).await.unwrap();
            prop_assert!(aliases.len() <= ALIAS_CAPACITY);
            prop_assert_eq!(aliases, expected);
            Ok(())
        })?;
    }
}

/// Last-seen bookkeeping
mod last_seen_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_player_never_seen() {
        let harness = harness();

        assert_eq!(
            harness.router.last_seen(player(9)).await.unwrap(),
            LastSeen::Never
        );
        assert_eq!(harness.router.elapsed_since(player(9)).await.unwrap(), None);
        assert!(harness.router.aliases(player(9)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_refreshes_timestamp() {
        let harness = harness();
        let mino = player(1);
        harness.connect(mino, "Mino").await;

        harness
            .clock
            .advance(Duration::hours(2) + Duration::minutes(30));
        harness
            .router
            .dispatch(warden_moderation::HookEvent::PlayerDisconnect {
                player: mino,
                name: "Mino".into(),
            })
            .await
            .unwrap();

        assert_eq!(
            harness.router.last_seen(mino).await.unwrap().at(),
            Some(harness.clock.current())
        );
    }

    #[tokio::test]
    async fn test_elapsed_since_last_seen() {
        let harness = harness();
        let mino = player(1);
        harness.connect(mino, "Mino").await;

        harness
            .clock
            .advance(Duration::days(3) + Duration::hours(4) + Duration::minutes(5));

        assert_eq!(
            harness.router.elapsed_since(mino).await.unwrap(),
            Some(Elapsed {
                days: 3,
                hours: 4,
                minutes: 5
            })
        );
    }

    #[tokio::test]
    async fn test_timestamp_stored_in_shared_format() {
        let harness = harness();
        let mino = player(1);
        harness.connect(mino, "Mino").await;

        let raw = harness
            .store
            .get(&format!("minqlx:players:{mino}:last_seen"))
            .await
            .unwrap();
        assert_eq!(raw.as_deref(), Some("2015-08-21 12:00:00"));
    }

    #[tokio::test]
    async fn test_unparseable_timestamp_is_an_error() {
        let harness = harness();
        let mino = player(1);
        harness
            .store
            .set(&format!("minqlx:players:{mino}:last_seen"), "last tuesday".into())
            .await
            .unwrap();

        assert!(harness.router.last_seen(mino).await.is_err());
    }
}

/// Store failures
mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_commit_changes_nothing() {
        let harness = harness();
        let mino = player(1);
        harness.connect(mino, "Mino").await;
        let commits = harness.store.commits();

        harness.clock.advance(Duration::hours(1));
        harness.store.fail_commits(true);
        let result = harness.router.record_presence(mino, "Minotaur").await;
        assert!(result.is_err());
        harness.store.fail_commits(false);

        assert_eq!(harness.store.commits(), commits);
        assert_eq!(harness.router.aliases(mino).await.unwrap(), vec!["Mino"]);
        assert_eq!(
            harness.router.elapsed_since(mino).await.unwrap(),
            Some(Elapsed {
                days: 0,
                hours: 1,
                minutes: 0
            })
        );
    }

    #[tokio::test]
    async fn test_unavailable_store_is_reported_by_last_seen() {
        let harness = harness();
        let mino = player(1);
        harness.connect(mino, "Mino").await;

        harness.store.fail_reads(true);
        assert!(matches!(
            harness.router.last_seen(mino).await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            harness.router.elapsed_since(mino).await,
            Err(StorageError::Unavailable(_))
        ));

        harness.store.fail_reads(false);
        assert_eq!(
            harness.router.last_seen(mino).await.unwrap(),
            LastSeen::At(harness.clock.current())
        );
    }

    #[tokio::test]
    async fn test_failed_read_is_reported_by_dispatch() {
        let harness = harness();
        harness.store.fail_reads(true);

        let result = harness
            .router
            .dispatch(warden_moderation::HookEvent::PlayerConnect {
                player: player(1),
                name: "Mino".into(),
            })
            .await;

        assert!(result.unwrap_err().is_storage());
        assert_eq!(harness.store.commits(), 0);
    }
}
