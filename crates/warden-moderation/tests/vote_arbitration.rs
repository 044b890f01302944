//! Vote arbitration tests
//!
//! Drives the arbiter through the event router with a manual timer so every
//! confirmation fires exactly when the test says so.

use proptest::prelude::*;
use std::time::Duration;
use warden_core::VoteTally;
use warden_moderation::{
    ForceOutcome, Resolution, ScheduledConfirmation, VetoReason, VoteDecision, CONFIRMATION_DELAY,
};
use warden_testkit::{ModerationHarness, StaticPolicy};

/// Auto-pass on a majority
mod majority_tests {
    use super::*;

    #[tokio::test]
    async fn test_majority_vote_is_passed_after_delay() {
        let harness = ModerationHarness::new(StaticPolicy::new().auto_pass(true));
        harness.open_vote(4, VoteTally::new(3, 1));

        assert_eq!(harness.call_vote("map", "campgrounds").await, VoteDecision::Continue);
        assert_eq!(harness.timer.requested_delays(), vec![CONFIRMATION_DELAY]);

        // Nothing happens before the delay elapses
        assert_eq!(harness.wait_short_of_confirmation().await, 0);
        assert!(harness.server.decisions().is_empty());

        assert_eq!(harness.timer.advance(Duration::from_secs(1)).await, 1);
        assert_eq!(harness.server.decisions(), vec![true]);
    }

    #[tokio::test]
    async fn test_minority_vote_is_left_alone() {
        let harness = ModerationHarness::new(StaticPolicy::new().auto_pass(true));
        harness.open_vote(4, VoteTally::new(1, 3));

        harness.call_vote("map", "campgrounds").await;
        harness.wait_confirmation().await;

        assert!(harness.server.decisions().is_empty());
        assert_eq!(harness.server.force_calls(), 0);
    }

    #[tokio::test]
    async fn test_tied_vote_is_left_alone() {
        let harness = ModerationHarness::new(StaticPolicy::new().auto_pass(true));
        harness.open_vote(4, VoteTally::new(2, 2));

        harness.call_vote("kick", "Mino").await;
        harness.wait_confirmation().await;

        assert_eq!(harness.server.force_calls(), 0);
    }

    #[tokio::test]
    async fn test_vote_that_ended_early_is_not_forced() {
        let harness = ModerationHarness::new(StaticPolicy::new().auto_pass(true));
        harness.open_vote(4, VoteTally::new(3, 0));

        harness.call_vote("map", "campgrounds").await;
        harness.server.set_vote(None);
        harness.wait_confirmation().await;

        assert_eq!(harness.server.force_calls(), 0);
    }

    #[tokio::test]
    async fn test_auto_pass_disabled_schedules_nothing() {
        let harness = ModerationHarness::new(StaticPolicy::new());
        harness.open_vote(4, VoteTally::new(4, 0));

        assert_eq!(harness.call_vote("map", "campgrounds").await, VoteDecision::Continue);
        assert_eq!(harness.timer.pending(), 0);
        assert_eq!(harness.router.arbiter().last_vote().await, None);
    }

    #[tokio::test]
    async fn test_policy_is_read_on_every_vote() {
        let harness = ModerationHarness::new(StaticPolicy::new());
        harness.open_vote(4, VoteTally::new(3, 1));

        harness.call_vote("map", "campgrounds").await;
        assert_eq!(harness.timer.pending(), 0);

        harness
            .policy
            .set(warden_moderation::POLICY_NAMESPACE, "AutoPassMajorityVote", 1);
        harness.call_vote("map", "campgrounds").await;
        assert_eq!(harness.timer.pending(), 1);

        harness.wait_confirmation().await;
        assert_eq!(harness.server.decisions(), vec![true]);
    }
}

/// Participation threshold
mod participation_tests {
    use super::*;

    fn harness(threshold: f64) -> ModerationHarness {
        ModerationHarness::new(StaticPolicy::new().auto_pass(true).participation(threshold))
    }

    #[tokio::test]
    async fn test_enough_participation_passes() {
        let harness = harness(0.5);
        harness.open_vote(10, VoteTally::new(4, 1));

        harness.call_vote("map", "campgrounds").await;
        harness.wait_confirmation().await;

        assert_eq!(harness.server.decisions(), vec![true]);
    }

    #[tokio::test]
    async fn test_insufficient_participation_is_left_alone() {
        let harness = harness(0.5);
        harness.open_vote(10, VoteTally::new(3, 1));

        harness.call_vote("map", "campgrounds").await;
        harness.wait_confirmation().await;

        assert!(harness.server.decisions().is_empty());
    }

    #[tokio::test]
    async fn test_spectators_do_not_count() {
        let harness = harness(0.5);
        harness.open_vote(4, VoteTally::new(2, 0));
        harness.server.populate(warden_core::Team::Spectator, 20);

        harness.call_vote("map", "campgrounds").await;
        harness.wait_confirmation().await;

        assert_eq!(harness.server.decisions(), vec![true]);
    }

    #[tokio::test]
    async fn test_threshold_is_captured_at_call_time() {
        let harness = harness(0.9);
        harness.open_vote(10, VoteTally::new(4, 1));

        harness.call_vote("map", "campgrounds").await;
        // Relaxing the policy afterwards does not affect the pending confirmation
        harness.policy.unset(
            warden_moderation::POLICY_NAMESPACE,
            "AutoPassRequireParticipation",
        );
        harness.wait_confirmation().await;

        assert!(harness.server.decisions().is_empty());
    }

    #[tokio::test]
    async fn test_empty_roster_never_meets_threshold() {
        let harness = harness(0.1);
        harness.server.set_vote(Some(VoteTally::new(1, 0)));

        let resolution = harness
            .router
            .arbiter()
            .resolve(ScheduledConfirmation {
                generation: 0,
                threshold: Some(0.1),
            })
            .await
            .unwrap();
        // Generation 0 was never handed out
        assert!(matches!(resolution, Resolution::Stale { captured: 0, .. }));

        harness.call_vote("map", "campgrounds").await;
        harness.wait_confirmation().await;
        assert!(harness.server.decisions().is_empty());
    }
}

/// Superseded confirmations
mod generation_tests {
    use super::*;

    #[tokio::test]
    async fn test_stale_confirmation_does_nothing() {
        let harness = ModerationHarness::new(StaticPolicy::new().auto_pass(true));
        harness.open_vote(4, VoteTally::new(3, 1));

        harness.call_vote("map", "campgrounds").await;
        harness.timer.advance(Duration::from_secs(10)).await;
        harness.call_vote("map", "bloodrun").await;
        assert_eq!(harness.router.arbiter().last_vote().await, Some(2));

        // First confirmation fires while the second vote is current
        assert!(harness.timer.fire_next().await.is_some());
        assert!(harness.server.decisions().is_empty());

        assert!(harness.timer.fire_next().await.is_some());
        assert_eq!(harness.server.decisions(), vec![true]);
    }

    #[tokio::test]
    async fn test_resolve_reports_stale_generation() {
        let harness = ModerationHarness::new(StaticPolicy::new().auto_pass(true));
        harness.open_vote(4, VoteTally::new(3, 1));
        harness.call_vote("map", "campgrounds").await;
        harness.call_vote("map", "bloodrun").await;

        let resolution = harness
            .router
            .arbiter()
            .resolve(ScheduledConfirmation {
                generation: 1,
                threshold: None,
            })
            .await
            .unwrap();
        assert_eq!(
            resolution,
            Resolution::Stale {
                captured: 1,
                current: Some(2)
            }
        );
        assert_eq!(harness.server.force_calls(), 0);
    }

    #[tokio::test]
    async fn test_vetoed_vote_does_not_advance_generation() {
        let harness = ModerationHarness::new(
            StaticPolicy::new().auto_pass(true).max_teamsize(4),
        );
        harness.call_vote("map", "campgrounds").await;
        harness.call_vote("teamsize", "8").await;

        assert_eq!(harness.router.arbiter().generation().await, 1);
        assert_eq!(harness.timer.pending(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_generation_counts_tracked_votes(kinds in prop::collection::vec(
            prop::sample::select(vec!["map", "kick", "teamsize"]),
            0..12,
        )) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            runtime.block_on(async {
                let harness = ModerationHarness::new(
                    StaticPolicy::new().auto_pass(true).max_teamsize(4),
                );
                let mut tracked = 0u64;
                let mut seen = Vec::new();
                for kind in &kinds {
                    // Teamsize 6 is always vetoed and never tracked
                    let decision = harness.call_vote(kind, "6").await;
                    if matches!(decision, VoteDecision::Continue) {
                        tracked += 1;
                    }
                    seen.push(harness.router.arbiter().generation().await);
                }
                prop_assert!(seen.windows(2).all(|w| w[0] <= w[1]));
                prop_assert_eq!(harness.router.arbiter().generation().await, tracked);
                prop_assert_eq!(harness.timer.pending() as u64, tracked);
                Ok(())
            })?;
        }
    }
}

/// Team size bounds
mod teamsize_tests {
    use super::*;

    #[tokio::test]
    async fn test_teamsize_above_maximum_is_vetoed() {
        let harness = ModerationHarness::new(
            StaticPolicy::new().auto_pass(true).max_teamsize(4),
        );

        let decision = harness.call_vote("teamsize", "6").await;
        assert_eq!(
            decision,
            VoteDecision::Veto(VetoReason::TeamsizeAboveMaximum {
                requested: 6,
                max: 4
            })
        );
        assert_eq!(harness.timer.pending(), 0);
    }

    #[tokio::test]
    async fn test_teamsize_below_minimum_is_vetoed() {
        let harness = ModerationHarness::new(StaticPolicy::new().min_teamsize(2));

        let decision = harness.call_vote("TeamSize", "1").await;
        assert_eq!(
            decision,
            VoteDecision::Veto(VetoReason::TeamsizeBelowMinimum {
                requested: 1,
                min: 2
            })
        );
    }

    #[tokio::test]
    async fn test_teamsize_within_bounds_continues() {
        let harness = ModerationHarness::new(
            StaticPolicy::new()
                .auto_pass(true)
                .min_teamsize(2)
                .max_teamsize(8),
        );

        assert_eq!(harness.call_vote("teamsize", " 4 ").await, VoteDecision::Continue);
        assert_eq!(harness.timer.pending(), 1);
    }

    #[tokio::test]
    async fn test_non_numeric_teamsize_is_ignored() {
        let harness = ModerationHarness::new(
            StaticPolicy::new().auto_pass(true).max_teamsize(4),
        );

        assert_eq!(harness.call_vote("teamsize", "huge").await, VoteDecision::Continue);
        assert_eq!(harness.timer.pending(), 0);
        assert_eq!(harness.router.arbiter().generation().await, 0);
    }

    #[tokio::test]
    async fn test_teamsize_limits_reflect_policy() {
        let harness = ModerationHarness::new(StaticPolicy::new().max_teamsize(5));
        let limits = harness.router.teamsize_limits();
        assert_eq!(limits.max, Some(5));
        assert_eq!(limits.min, None);
    }
}

/// Explicit pass and veto
mod force_tests {
    use super::*;

    #[tokio::test]
    async fn test_force_without_vote_is_noop() {
        let harness = ModerationHarness::new(StaticPolicy::new());

        let outcome = harness.router.force_current(true).await.unwrap();
        assert_eq!(outcome, ForceOutcome::NoActiveVote);
        assert_eq!(harness.server.force_calls(), 0);
    }

    #[tokio::test]
    async fn test_force_veto_then_confirmation_finds_no_vote() {
        let harness = ModerationHarness::new(StaticPolicy::new().auto_pass(true));
        harness.open_vote(4, VoteTally::new(3, 1));
        harness.call_vote("map", "campgrounds").await;

        let outcome = harness.router.force_current(false).await.unwrap();
        assert_eq!(outcome, ForceOutcome::Forced);
        harness.wait_confirmation().await;

        assert_eq!(harness.server.decisions(), vec![false]);
        assert_eq!(harness.server.force_calls(), 1);
    }

    #[tokio::test]
    async fn test_server_failure_is_reported() {
        let harness = ModerationHarness::new(StaticPolicy::new());
        harness.server.set_unavailable(true);

        assert!(harness.router.force_current(true).await.is_err());
    }
}
