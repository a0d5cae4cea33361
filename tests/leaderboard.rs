//! Integration tests for scoring aggregation, ranking, replay and
//! per-tournament quarantine of inconsistent ledgers.

use chrono::Utc;
use fantasy_league_web::logic::{
    check_invariants, create_tournament, join, rank, settle_purchase, Aggregator, ScoringRule,
    StandardScoring,
};
use fantasy_league_web::models::{
    CricketStats, KabaddiStats, ParticipantId, PerformanceEvent, Role, Sport, SquadMember,
    StatDelta, TournamentSettingsInput, TournamentStatus,
};
use fantasy_league_web::{Catalog, Catalogs, Player, Registry, SystemClock, Tournament};
use std::sync::Arc;
use uuid::Uuid;

type Pid = ParticipantId;

fn cricket_catalog() -> Catalog {
    Catalog::from_players(
        Sport::Cricket,
        vec![
            Player::new(1, "Opener", Role::Batsman, 100_000),
            Player::new(2, "Quick", Role::Bowler, 100_000),
            Player::new(3, "Keeper", Role::WicketKeeper, 100_000),
        ],
    )
    .unwrap()
}

fn registry() -> Registry {
    Registry::with_catalogs(Catalogs::new(cricket_catalog(), Catalog::empty(Sport::Kabaddi)))
}

/// Live tournament where A owns player 1 and B owns player 2.
fn live_tournament() -> (Tournament, Pid, Pid) {
    let now = Utc::now();
    let mut t = create_tournament(
        "admin",
        Sport::Cricket,
        TournamentSettingsInput::default(),
        &cricket_catalog(),
        now,
    )
    .unwrap();
    let a = join(&mut t, "ua", "A", now).unwrap().id;
    let b = join(&mut t, "ub", "B", now).unwrap().id;
    settle_purchase(&mut t, a, 1, Role::Batsman, 100_000).unwrap();
    settle_purchase(&mut t, b, 2, Role::Bowler, 150_000).unwrap();
    t.status = TournamentStatus::Live;
    (t, a, b)
}

fn runs(n: i64) -> StatDelta {
    StatDelta::Cricket(CricketStats {
        runs: n,
        ..Default::default()
    })
}

fn wickets(n: i64) -> StatDelta {
    StatDelta::Cricket(CricketStats {
        wickets: n,
        ..Default::default()
    })
}

#[test]
fn scenario_d_runs_rerank_the_owner() {
    let registry = registry();
    let (t, a, b) = live_tournament();
    let id = registry.import_tournament(t).unwrap().id;

    let (_, board) = registry.record_performance(&id, 2, wickets(2), None).unwrap();
    assert_eq!(board.entries[0].participant_id, b);
    assert_eq!(board.entries[0].total_points, 50);

    let delta = runs(85);
    let expected = StandardScoring.points(&delta);
    let (applied, board) = registry.record_performance(&id, 1, delta, None).unwrap();
    assert!(applied);
    let first = &board.entries[0];
    assert_eq!(first.participant_id, a);
    assert_eq!(first.total_points, expected);
    assert_eq!(first.rank, 1);
    assert_eq!(first.players[0].player_id, 1);
    assert_eq!(board.entries[1].rank, 2);

    let read = registry.leaderboard(&id).unwrap();
    assert_eq!(read.entries, board.entries);
    assert_eq!(read.events, 2);
}

#[test]
fn ties_go_to_the_earlier_joiner() {
    let registry = registry();
    let (t, a, b) = live_tournament();
    let id = registry.import_tournament(t).unwrap().id;

    let board = registry.leaderboard(&id).unwrap();
    assert_eq!(board.entries[0].participant_id, a);

    registry.record_performance(&id, 2, wickets(1), None).unwrap();
    assert_eq!(registry.leaderboard(&id).unwrap().entries[0].participant_id, b);

    let (_, board) = registry.record_performance(&id, 1, runs(25), None).unwrap();
    assert_eq!(board.entries[0].total_points, board.entries[1].total_points);
    assert_eq!(board.entries[0].participant_id, a);
    assert_eq!(board.entries[0].rank, 1);
    assert_eq!(board.entries[1].participant_id, b);
    assert_eq!(board.entries[1].rank, 2);
}

#[test]
fn event_order_does_not_change_totals_or_ranks() {
    let (t, _, _) = live_tournament();
    let now = Utc::now();
    let events: Vec<PerformanceEvent> = vec![
        PerformanceEvent::new(t.id.clone(), 1, runs(40), now),
        PerformanceEvent::new(t.id.clone(), 2, wickets(3), now),
        PerformanceEvent::new(t.id.clone(), 1, runs(-5), now),
        PerformanceEvent::new(t.id.clone(), 3, runs(100), now),
        PerformanceEvent::new(t.id.clone(), 2, wickets(-1), now),
    ];
    let forward = rank(&t.participants, &Aggregator::replay(&events, &StandardScoring).unwrap());
    let reversed: Vec<_> = events.iter().rev().cloned().collect();
    let backward = rank(&t.participants, &Aggregator::replay(&reversed, &StandardScoring).unwrap());
    let interleaved: Vec<_> = [1, 3, 0, 4, 2].iter().map(|&i| events[i].clone()).collect();
    let mixed = rank(&t.participants, &Aggregator::replay(&interleaved, &StandardScoring).unwrap());

    assert_eq!(forward, backward);
    assert_eq!(forward, mixed);
    // Player 3 is unowned and counts for nobody.
    assert_eq!(forward.iter().map(|e| e.total_points).sum::<i64>(), 35 + 50);
}

#[test]
fn redelivered_events_are_counted_once() {
    let registry = registry();
    let (t, a, _) = live_tournament();
    let id = registry.import_tournament(t).unwrap().id;
    let event_id = Uuid::new_v4();

    let (first, _) = registry.record_performance(&id, 1, runs(30), Some(event_id)).unwrap();
    let (second, board) = registry.record_performance(&id, 1, runs(30), Some(event_id)).unwrap();
    assert!(first);
    assert!(!second);
    let entry = board.entries.iter().find(|e| e.participant_id == a).unwrap();
    assert_eq!(entry.total_points, 30);
    assert_eq!(board.events, 1);
    // Two seeded sales plus the one event.
    assert_eq!(registry.context(&id).unwrap().log().len(), 3);
}

#[test]
fn out_of_range_stats_are_rejected_before_scoring() {
    let registry = registry();
    let (t, _, _) = live_tournament();
    let id = registry.import_tournament(t).unwrap().id;

    let delta = StatDelta::Cricket(CricketStats {
        runs: i64::MAX,
        wickets: 1,
        ..Default::default()
    });
    let err = registry.record_performance(&id, 1, delta, None).unwrap_err();
    assert_eq!(err.kind(), "ValidationError");
    assert!(err.to_string().contains("runs"), "{err}");
    assert_eq!(registry.leaderboard(&id).unwrap().events, 0);
    assert_eq!(registry.context(&id).unwrap().log().len(), 2);
}

#[test]
fn overflowing_event_is_not_marked_as_seen() {
    // Any innings of 500 or more maxes out the total.
    let rule = |delta: &StatDelta| -> i64 {
        match delta {
            StatDelta::Cricket(s) if s.runs >= 500 => i64::MAX,
            other => StandardScoring.points(other),
        }
    };
    let registry = Registry::new(
        Catalogs::new(cricket_catalog(), Catalog::empty(Sport::Kabaddi)),
        Arc::new(rule),
        Arc::new(SystemClock),
    );
    let (t, a, _) = live_tournament();
    let id = registry.import_tournament(t).unwrap().id;
    let event_id = Uuid::new_v4();

    registry.record_performance(&id, 1, runs(10), None).unwrap();
    let err = registry
        .record_performance(&id, 1, runs(600), Some(event_id))
        .unwrap_err();
    assert_eq!(err.kind(), "ValidationError");
    assert_eq!(registry.context(&id).unwrap().log().len(), 3);

    // A corrected re-delivery under the same id still counts.
    let (applied, board) = registry
        .record_performance(&id, 1, runs(20), Some(event_id))
        .unwrap();
    assert!(applied);
    assert_eq!(board.entry(a).unwrap().total_points, 30);
    assert_eq!(board.events, 2);

    // Replaying the log reproduces the same totals.
    let recovered = registry.recover(&id).unwrap();
    assert_eq!(recovered.entries, board.entries);
}

#[test]
fn custom_scoring_rule_is_injected() {
    let (t, a, b) = live_tournament();
    let now = Utc::now();
    let events = vec![
        PerformanceEvent::new(t.id.clone(), 1, runs(10), now),
        PerformanceEvent::new(t.id.clone(), 2, wickets(1), now),
    ];
    let flat = |_: &StatDelta| -> i64 { 3 };
    let board = rank(&t.participants, &Aggregator::replay(&events, &flat).unwrap());
    assert_eq!(board[0].participant_id, a);
    assert_eq!(board[0].total_points, 3);
    assert_eq!(board[1].participant_id, b);
    assert_eq!(board[1].total_points, 3);
}

#[test]
fn performance_is_refused_outside_live_or_for_unknown_players() {
    let registry = registry();
    let created = registry
        .create_tournament("admin", Sport::Cricket, TournamentSettingsInput::default())
        .unwrap();
    let err = registry.record_performance(&created.id, 1, runs(10), None).unwrap_err();
    assert_eq!(err.kind(), "StateError");

    let (t, _, _) = live_tournament();
    let id = registry.import_tournament(t).unwrap().id;
    let err = registry.record_performance(&id, 42, runs(10), None).unwrap_err();
    assert_eq!(err.kind(), "NotFoundError");

    let kabaddi = StatDelta::Kabaddi(KabaddiStats {
        raid_points: 5,
        ..Default::default()
    });
    let err = registry.record_performance(&id, 1, kabaddi, None).unwrap_err();
    assert_eq!(err.kind(), "ValidationError");
}

#[test]
fn inconsistent_tournament_is_quarantined_alone_and_recovers_by_replay() {
    let registry = registry();
    let (healthy, _, _) = live_tournament();
    let healthy_id = registry.import_tournament(healthy).unwrap().id;

    let (mut broken, a, _) = live_tournament();
    // Balance no longer matches what the squad cost.
    broken.participant_mut(a).unwrap().budget_remaining += 1;
    let broken_id = registry.import_tournament(broken).unwrap().id;

    let err = registry.leaderboard(&broken_id).unwrap_err();
    assert_eq!(err.kind(), "InconsistentStateError");
    let err = registry.record_performance(&broken_id, 1, runs(10), None).unwrap_err();
    assert_eq!(err.kind(), "InconsistentStateError");

    registry.record_performance(&healthy_id, 1, runs(10), None).unwrap();
    assert_eq!(registry.leaderboard(&healthy_id).unwrap().entries[0].total_points, 10);

    let board = registry.recover(&broken_id).unwrap();
    assert_eq!(board.entries.len(), 2);
    let repaired = registry.get_tournament(&broken_id).unwrap();
    assert!(repaired.inconsistent.is_none());
    assert_eq!(
        repaired.participant(a).unwrap().budget_remaining,
        repaired.settings.budget - 100_000
    );
    assert!(registry.leaderboard(&broken_id).is_ok());
}

#[test]
fn double_ownership_cannot_be_recovered() {
    let registry = registry();
    let (mut broken, _, b) = live_tournament();
    // Player 1 shows up in both squads.
    let participant = broken.participant_mut(b).unwrap();
    participant.squad.add(
        Role::Batsman,
        SquadMember {
            player_id: 1,
            price: 0,
        },
    );
    let id = registry.import_tournament(broken).unwrap().id;

    assert_eq!(registry.leaderboard(&id).unwrap_err().kind(), "InconsistentStateError");
    assert_eq!(registry.recover(&id).unwrap_err().kind(), "InconsistentStateError");
    assert!(registry.get_tournament(&id).unwrap().inconsistent.is_some());
}

#[test]
fn hostile_balances_fail_the_check_instead_of_overflowing() {
    let (mut t, a, b) = live_tournament();
    t.participant_mut(a).unwrap().budget_remaining = u64::MAX;
    let reason = check_invariants(&t).unwrap_err();
    assert!(reason.contains("does not match"), "{reason}");

    let (mut t, _, _) = live_tournament();
    t.participant_mut(b).unwrap().squad.add(
        Role::Bowler,
        SquadMember {
            player_id: 3,
            price: u64::MAX,
        },
    );
    let reason = check_invariants(&t).unwrap_err();
    assert!(reason.contains("overflow"), "{reason}");

    let registry = registry();
    let id = registry.import_tournament(t).unwrap().id;
    assert_eq!(registry.leaderboard(&id).unwrap_err().kind(), "InconsistentStateError");
}
