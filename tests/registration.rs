//! Integration tests for tournament setup, join admission and lifecycle.

use chrono::NaiveDate;
use fantasy_league_web::models::{
    AuctionSettings, Role, Sport, SquadRules, TournamentSettingsInput, TournamentStatus,
};
use fantasy_league_web::logic::registration::prize_pool;
use fantasy_league_web::{Catalog, Catalogs, Player, Registry};
use std::sync::Arc;
use std::thread;

fn registry() -> Registry {
    let cricket = Catalog::from_players(
        Sport::Cricket,
        vec![
            Player::new(1, "Opener", Role::Batsman, 100_000),
            Player::new(2, "Quick", Role::Bowler, 100_000),
        ],
    )
    .unwrap();
    Registry::with_catalogs(Catalogs::new(cricket, Catalog::empty(Sport::Kabaddi)))
}

fn scenario_a_input() -> TournamentSettingsInput {
    TournamentSettingsInput {
        name: Some("Scenario A".into()),
        budget: Some(50_000_000),
        max_participants: Some(2),
        squad_rules: Some(SquadRules::new([
            (Role::Batsman, 4),
            (Role::Bowler, 4),
            (Role::AllRounder, 2),
            (Role::WicketKeeper, 1),
        ])),
        ..Default::default()
    }
}

#[test]
fn scenario_a_third_join_hits_capacity() {
    let registry = registry();
    let t = registry
        .create_tournament("admin", Sport::Cricket, scenario_a_input())
        .unwrap();
    assert_eq!(t.status, TournamentStatus::Created);
    assert_eq!(t.id.len(), 8);

    let (first, _) = registry.join(&t.id, "u1", "Alice").unwrap();
    let (second, after) = registry.join(&t.id, "u2", "").unwrap();
    assert_eq!(first.budget_remaining, 50_000_000);
    assert_eq!(first.join_order, 0);
    assert_eq!(second.join_order, 1);
    assert_eq!(second.username, "u2");
    assert_eq!(after.participants.len(), 2);

    let err = registry.join(&t.id, "u3", "Carol").unwrap_err();
    assert_eq!(err.kind(), "CapacityError");
    assert_eq!(registry.participants(&t.id).unwrap().len(), 2);
}

#[test]
fn concurrent_joins_never_exceed_the_cap() {
    let registry = Arc::new(registry());
    let input = TournamentSettingsInput {
        max_participants: Some(5),
        ..Default::default()
    };
    let id = registry
        .create_tournament("admin", Sport::Cricket, input)
        .unwrap()
        .id;

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let registry = registry.clone();
            let id = id.clone();
            thread::spawn(move || registry.join(&id, &format!("user-{i}"), "").is_ok())
        })
        .collect();
    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(admitted, 5);
    let participants = registry.participants(&id).unwrap();
    assert_eq!(participants.len(), 5);
    let mut orders: Vec<_> = participants.iter().map(|p| p.join_order).collect();
    orders.sort_unstable();
    assert_eq!(orders, vec![0, 1, 2, 3, 4]);
}

#[test]
fn duplicate_and_empty_users_are_rejected() {
    let registry = registry();
    let id = registry
        .create_tournament("admin", Sport::Cricket, TournamentSettingsInput::default())
        .unwrap()
        .id;
    registry.join(&id, "u1", "Alice").unwrap();
    assert_eq!(registry.join(&id, "u1", "Again").unwrap_err().kind(), "ValidationError");
    assert_eq!(registry.join(&id, "  ", "Nobody").unwrap_err().kind(), "ValidationError");
}

#[test]
fn unknown_tournament_is_not_found() {
    let registry = registry();
    assert_eq!(registry.get_tournament("UNKNOWN").unwrap_err().kind(), "NotFoundError");
    assert_eq!(registry.join("UNKNOWN", "u1", "").unwrap_err().kind(), "NotFoundError");
    assert_eq!(registry.participants("UNKNOWN").unwrap_err().kind(), "NotFoundError");
}

#[test]
fn sport_defaults_fill_missing_settings() {
    let registry = registry();
    let t = registry
        .create_tournament("admin", Sport::Kabaddi, TournamentSettingsInput::default())
        .unwrap();
    assert_eq!(t.settings.budget, 30_000_000);
    assert_eq!(t.settings.max_participants, 8);
    assert_eq!(t.settings.squad_rules.quota(Role::Raider), 4);
    assert_eq!(t.settings.squad_rules.total(), 12);
    assert_eq!(t.settings.auction_settings, AuctionSettings::default());
    assert_eq!(t.settings.auction_settings.minimum_bid, 50_000);
    assert_eq!(t.settings.auction_settings.bid_increment, 25_000);
    assert_eq!(t.settings.auction_settings.bid_timeout, 30);
}

#[test]
fn invalid_settings_are_rejected_with_the_offending_field() {
    let registry = registry();
    let cases: Vec<(TournamentSettingsInput, &str)> = vec![
        (
            TournamentSettingsInput {
                budget: Some(0),
                ..Default::default()
            },
            "budget",
        ),
        (
            TournamentSettingsInput {
                max_participants: Some(0),
                ..Default::default()
            },
            "maxParticipants",
        ),
        (
            TournamentSettingsInput {
                squad_rules: Some(SquadRules::new([(Role::Raider, 2)])),
                ..Default::default()
            },
            "squadRules",
        ),
        (
            TournamentSettingsInput {
                squad_rules: Some(SquadRules::new([
                    (Role::Batsman, u32::MAX),
                    (Role::Bowler, 1),
                ])),
                ..Default::default()
            },
            "squadRules",
        ),
        (
            TournamentSettingsInput {
                squad_rules: Some(SquadRules::new([(Role::Batsman, 2)]).with_total(3)),
                ..Default::default()
            },
            "squadRules.totalPlayers",
        ),
        (
            TournamentSettingsInput {
                start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
                end_date: NaiveDate::from_ymd_opt(2024, 4, 1),
                ..Default::default()
            },
            "endDate",
        ),
        (
            TournamentSettingsInput {
                auction_settings: Some(AuctionSettings {
                    bid_increment: 0,
                    ..Default::default()
                }),
                ..Default::default()
            },
            "auctionSettings.bidIncrement",
        ),
        (
            TournamentSettingsInput {
                entry_fee: Some(u64::MAX),
                max_participants: Some(2),
                ..Default::default()
            },
            "entryFee",
        ),
        (
            TournamentSettingsInput {
                selected_players: vec![1, 99],
                ..Default::default()
            },
            "selectedPlayers",
        ),
    ];
    for (input, field) in cases {
        let err = registry
            .create_tournament("admin", Sport::Cricket, input)
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError", "{field}");
        assert!(err.to_string().starts_with(&format!("invalid {field}:")), "{err}");
    }
}

#[test]
fn entry_fees_build_the_prize_pool() {
    let registry = registry();
    let input = TournamentSettingsInput {
        entry_fee: Some(500),
        ..Default::default()
    };
    let id = registry.create_tournament("admin", Sport::Cricket, input).unwrap().id;
    registry.join(&id, "u1", "").unwrap();
    registry.join(&id, "u2", "").unwrap();
    registry.mark_entry_fee_paid(&id, "u1").unwrap();
    let t = registry.mark_entry_fee_paid(&id, "u2").unwrap();
    assert_eq!(t.prize_pool, 1_000);
    assert_eq!(
        registry.mark_entry_fee_paid(&id, "ghost").unwrap_err().kind(),
        "NotFoundError"
    );
}

#[test]
fn largest_entry_fee_fills_the_pool_without_overflow() {
    let registry = registry();
    let input = TournamentSettingsInput {
        entry_fee: Some(u64::MAX / 2),
        max_participants: Some(2),
        ..Default::default()
    };
    let id = registry.create_tournament("admin", Sport::Cricket, input).unwrap().id;
    registry.join(&id, "u1", "").unwrap();
    registry.join(&id, "u2", "").unwrap();
    registry.mark_entry_fee_paid(&id, "u1").unwrap();
    let t = registry.mark_entry_fee_paid(&id, "u2").unwrap();
    assert_eq!(t.prize_pool, (u64::MAX / 2) * 2);
    // Paying twice does not count twice.
    let t = registry.mark_entry_fee_paid(&id, "u2").unwrap();
    assert_eq!(t.prize_pool, (u64::MAX / 2) * 2);
}

#[test]
fn prize_pool_overflow_is_a_validation_error() {
    let err = prize_pool(2, u64::MAX).unwrap_err();
    assert_eq!(err.kind(), "ValidationError");
    assert_eq!(prize_pool(3, 500).unwrap(), 1_500);
}

#[test]
fn lifecycle_guards() {
    let registry = registry();
    let id = registry
        .create_tournament("admin", Sport::Cricket, TournamentSettingsInput::default())
        .unwrap()
        .id;
    assert_eq!(
        registry.open_registration(&id).unwrap().status,
        TournamentStatus::Open
    );
    assert_eq!(registry.open_registration(&id).unwrap_err().kind(), "StateError");
    registry.join(&id, "u1", "").unwrap();

    // One participant is not enough to run an auction.
    assert_eq!(registry.start_auction(&id, 1).unwrap_err().kind(), "StateError");
    assert_eq!(registry.start_auction(&id, 0).unwrap_err().kind(), "ValidationError");
    assert_eq!(registry.complete(&id).unwrap_err().kind(), "StateError");
}

#[test]
fn listing_is_in_creation_order() {
    let registry = registry();
    let first = registry
        .create_tournament("admin", Sport::Cricket, TournamentSettingsInput::default())
        .unwrap();
    let second = registry
        .create_tournament("admin", Sport::Kabaddi, TournamentSettingsInput::default())
        .unwrap();
    let listed = registry.list_tournaments();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|s| s.id == first.id && s.sport == Sport::Cricket));
    assert!(listed.iter().any(|s| s.id == second.id && s.name == "kabaddi tournament"));
}
