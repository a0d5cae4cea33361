//! Integration tests for room tasks driven through the registry with a
//! manual clock.

use chrono::{Duration, TimeZone, Utc};
use fantasy_league_web::logic::{Advance, TickOutcome};
use fantasy_league_web::models::{LotOutcome, ParticipantId, RoomStatus, TournamentSettingsInput};
use fantasy_league_web::{
    Catalog, Catalogs, Clock, ManualClock, Player, Registry, Role, Sport, StandardScoring,
    TournamentStatus,
};
use std::sync::Arc;

struct Fixture {
    clock: Arc<ManualClock>,
    registry: Arc<Registry>,
    id: String,
    a: ParticipantId,
    b: ParticipantId,
}

fn fixture() -> Fixture {
    let cricket = Catalog::from_players(
        Sport::Cricket,
        vec![
            Player::new(1, "Opener", Role::Batsman, 100_000),
            Player::new(2, "Quick", Role::Bowler, 100_000),
        ],
    )
    .unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap(),
    ));
    let registry = Arc::new(Registry::new(
        Catalogs::new(cricket, Catalog::empty(Sport::Kabaddi)),
        Arc::new(StandardScoring),
        clock.clone(),
    ));
    let id = registry
        .create_tournament("admin", Sport::Cricket, TournamentSettingsInput::default())
        .unwrap()
        .id;
    let (a, _) = registry.join(&id, "ua", "A").unwrap();
    let (b, _) = registry.join(&id, "ub", "B").unwrap();
    Fixture {
        clock,
        registry,
        id,
        a: a.id,
        b: b.id,
    }
}

async fn wait_for_status(registry: &Registry, id: &str, status: TournamentStatus) {
    for _ in 0..200 {
        if registry.get_tournament(id).unwrap().status == status {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("tournament {id} never reached {status:?}");
}

#[tokio::test]
async fn bids_settle_and_the_tournament_goes_live() {
    let f = fixture();
    let (t, rooms) = f.registry.start_auction(&f.id, 1).unwrap();
    assert_eq!(t.status, TournamentStatus::Auctioning);
    assert_eq!(rooms, vec![format!("{}-R1", f.id)]);
    let room = rooms[0].as_str();

    let view = f.registry.room_view(room).unwrap();
    assert_eq!(view.status, RoomStatus::LotOpen);
    assert_eq!(view.next_minimum_bid, Some(50_000));
    let first = view.current_lot.as_ref().unwrap().player_id;
    assert_eq!(view.player.as_ref().unwrap().id, first);

    f.registry.place_bid(room, f.a, 50_000).await.unwrap();
    let err = f.registry.place_bid(room, f.b, 60_000).await.unwrap_err();
    assert_eq!(err.kind(), "ValidationError");
    f.clock.advance(Duration::seconds(10));
    f.registry.place_bid(room, f.b, 75_000).await.unwrap();

    let view = f.registry.room_view(room).unwrap();
    let highest = view.current_lot.as_ref().unwrap().current_highest_bid.unwrap();
    assert_eq!(highest.bidder, f.b);
    assert_eq!(highest.amount, 75_000);
    assert_eq!(view.next_minimum_bid, Some(100_000));

    assert!(matches!(f.registry.tick_room(room).await.unwrap(), TickOutcome::Waiting));
    f.clock.advance(Duration::seconds(30));
    match f.registry.tick_room(room).await.unwrap() {
        TickOutcome::Settled {
            outcome:
                LotOutcome::Sold {
                    player_id,
                    winner,
                    price,
                    ..
                },
            next: Advance::Opened(_),
        } => {
            assert_eq!(player_id, first);
            assert_eq!(winner, f.b);
            assert_eq!(price, 75_000);
        }
        other => panic!("unexpected tick outcome {other:?}"),
    }

    let t = f.registry.get_tournament(&f.id).unwrap();
    let winner = t.participant(f.b).unwrap();
    assert!(winner.squad.contains(first));
    assert_eq!(winner.budget_remaining, t.settings.budget - 75_000);
    let board = f.registry.leaderboard(&f.id).unwrap();
    assert_eq!(board.entry(f.b).unwrap().players.len(), 1);

    // Nobody bids on the second player: relisted once, then dropped.
    f.clock.advance(Duration::seconds(30));
    assert!(matches!(
        f.registry.tick_room(room).await.unwrap(),
        TickOutcome::Settled {
            outcome: LotOutcome::Unsold { requeued: true, .. },
            ..
        }
    ));
    f.clock.advance(Duration::seconds(30));
    assert!(matches!(
        f.registry.tick_room(room).await.unwrap(),
        TickOutcome::Settled {
            outcome: LotOutcome::Unsold {
                requeued: false,
                ..
            },
            next: Advance::Closed,
        }
    ));

    wait_for_status(&f.registry, &f.id, TournamentStatus::Live).await;
    let view = f.registry.room_view(room).unwrap();
    assert_eq!(view.status, RoomStatus::Closed);
    let summary = view.summary.as_ref().unwrap();
    assert_eq!(summary.sold, 1);
    assert_eq!(summary.unsold, 2);

    let err = f.registry.place_bid(room, f.a, 1_000_000).await.unwrap_err();
    assert_eq!(err.kind(), "StateError");
    assert!(f.registry.get_tournament(&f.id).unwrap().rooms[0].closed);
}

#[tokio::test]
async fn closing_warning_is_published() {
    let f = fixture();
    let (_, rooms) = f.registry.start_auction(&f.id, 1).unwrap();
    let room = rooms[0].as_str();

    f.clock.advance(Duration::seconds(25));
    assert!(matches!(f.registry.tick_room(room).await.unwrap(), TickOutcome::Closing));
    assert_eq!(f.registry.room_view(room).unwrap().status, RoomStatus::LotClosing);

    // A bid in the warning window buys a fresh countdown.
    f.registry.place_bid(room, f.a, 50_000).await.unwrap();
    let view = f.registry.room_view(room).unwrap();
    assert_eq!(view.status, RoomStatus::LotOpen);
    assert_eq!(
        view.current_lot.as_ref().unwrap().deadline,
        f.clock.now() + Duration::seconds(30)
    );
}

#[tokio::test]
async fn concurrent_bids_are_applied_one_at_a_time() {
    let f = fixture();
    let (_, rooms) = f.registry.start_auction(&f.id, 1).unwrap();
    let room = rooms[0].clone();

    let tasks: Vec<_> = (0..12u64)
        .map(|i| {
            let registry = f.registry.clone();
            let room = room.clone();
            let bidder = if i % 2 == 0 { f.a } else { f.b };
            tokio::spawn(async move { registry.place_bid(&room, bidder, 50_000 + i * 25_000).await })
        })
        .collect();
    let mut accepted = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    let view = f.registry.room_view(&room).unwrap();
    let lot = view.current_lot.as_ref().unwrap();
    assert_eq!(lot.history.len(), accepted);
    assert!(lot.history.windows(2).all(|w| w[1].amount >= w[0].amount + 25_000));
    assert_eq!(lot.current_highest_bid.unwrap().amount, 325_000);
    let logged = f.registry.context(&f.id).unwrap().log().bids(&room);
    assert_eq!(logged, lot.history);
}

#[tokio::test]
async fn tournament_waits_for_every_room() {
    let f = fixture();
    let (_, rooms) = f.registry.start_auction(&f.id, 2).unwrap();
    assert_eq!(rooms.len(), 2);

    // One player per room, no bids: each room needs two expiries to close.
    for _ in 0..2 {
        f.clock.advance(Duration::seconds(30));
        f.registry.tick_room(&rooms[0]).await.unwrap();
    }
    tokio::task::yield_now().await;
    assert_eq!(
        f.registry.room_view(&rooms[0]).unwrap().status,
        RoomStatus::Closed
    );
    assert_eq!(
        f.registry.get_tournament(&f.id).unwrap().status,
        TournamentStatus::Auctioning
    );

    // Room 2's lot expired long ago; the first tick settles it.
    f.registry.tick_room(&rooms[1]).await.unwrap();
    f.clock.advance(Duration::seconds(30));
    f.registry.tick_room(&rooms[1]).await.unwrap();
    wait_for_status(&f.registry, &f.id, TournamentStatus::Live).await;
}

#[tokio::test]
async fn unknown_room_is_not_found() {
    let f = fixture();
    let err = f.registry.place_bid("nope", f.a, 50_000).await.unwrap_err();
    assert_eq!(err.kind(), "NotFoundError");
    assert_eq!(f.registry.room_view("nope").unwrap_err().kind(), "NotFoundError");
}
