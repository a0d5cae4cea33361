//! One tokio task per auction room.
//!
//! The task owns the room's state machine and is the only writer. Bids and
//! timer ticks reach it through a bounded queue and are applied strictly in
//! arrival order; readers get the last published `RoomView`.

use crate::catalog::Catalog;
use crate::clock::Clock;
use crate::error::{FantasyError, Result};
use crate::logic::{bid_validator, lifecycle, Advance, AuctionRoom, TickOutcome};
use crate::models::{
    Amount, Bid, Lot, LotOutcome, ParticipantId, Player, RoomId, RoomStatus, SettledLot,
    SettlementSummary, TournamentId,
};
use crate::runtime::audit_log::LogRecord;
use crate::runtime::context::TournamentContext;
use crate::runtime::snapshot::SnapshotCell;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Commands queued per room before senders wait.
const ROOM_QUEUE_CAPACITY: usize = 256;

pub enum RoomCommand {
    Bid {
        bidder: ParticipantId,
        amount: Amount,
        reply: oneshot::Sender<Result<Bid>>,
    },
    /// Check the countdown now instead of waiting for the task's own timer.
    Tick {
        reply: oneshot::Sender<Result<TickOutcome>>,
    },
}

/// Read-only projection of a room, republished after every change.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_id: RoomId,
    pub tournament_id: TournamentId,
    pub status: RoomStatus,
    pub current_lot: Option<Lot>,
    /// Catalog record for the player on the block.
    pub player: Option<Player>,
    /// Smallest bid that would currently be accepted.
    pub next_minimum_bid: Option<Amount>,
    pub queued: usize,
    pub results: Vec<SettledLot>,
    pub summary: Option<SettlementSummary>,
    pub updated_at: DateTime<Utc>,
}

impl RoomView {
    fn of(room: &AuctionRoom, catalog: &Catalog, now: DateTime<Utc>) -> Self {
        let lot = room.current_lot();
        Self {
            room_id: room.id.clone(),
            tournament_id: room.tournament_id.clone(),
            status: room.status(),
            current_lot: lot.cloned(),
            player: lot.and_then(|l| catalog.get(l.player_id)).cloned(),
            next_minimum_bid: lot.map(|l| bid_validator::floor(l, room.settings())),
            queued: room.queued().count(),
            results: room.results().to_vec(),
            summary: room.summary().cloned(),
            updated_at: now,
        }
    }
}

/// Cloneable handle to a running room.
#[derive(Clone)]
pub struct RoomHandle {
    pub id: RoomId,
    pub tournament_id: TournamentId,
    tx: mpsc::Sender<RoomCommand>,
    view: Arc<SnapshotCell<RoomView>>,
}

impl RoomHandle {
    pub fn view(&self) -> Arc<RoomView> {
        self.view.load()
    }

    pub async fn place_bid(&self, bidder: ParticipantId, amount: Amount) -> Result<Bid> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Bid {
            bidder,
            amount,
            reply,
        })
        .await?;
        rx.await.map_err(|_| self.closed())?
    }

    pub async fn tick(&self) -> Result<TickOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Tick { reply }).await?;
        rx.await.map_err(|_| self.closed())?
    }

    async fn send(&self, cmd: RoomCommand) -> Result<()> {
        self.tx.send(cmd).await.map_err(|_| self.closed())
    }

    fn closed(&self) -> FantasyError {
        FantasyError::State(format!("room {} is closed", self.id))
    }
}

struct RoomActor {
    room: AuctionRoom,
    ctx: Arc<TournamentContext>,
    catalog: Arc<Catalog>,
    clock: Arc<dyn Clock>,
    view: Arc<SnapshotCell<RoomView>>,
}

/// Open the room's first lot and start its task.
///
/// Must be called from within a tokio runtime.
pub fn spawn_room(
    mut room: AuctionRoom,
    ctx: Arc<TournamentContext>,
    catalog: Arc<Catalog>,
    clock: Arc<dyn Clock>,
) -> Result<RoomHandle> {
    let now = clock.now();
    let first = {
        let tournament = ctx.lock();
        room.open_next_lot(&tournament, now)?
    };
    let view = Arc::new(SnapshotCell::new(RoomView::of(&room, &catalog, now)));
    let (tx, rx) = mpsc::channel(ROOM_QUEUE_CAPACITY);
    let handle = RoomHandle {
        id: room.id.clone(),
        tournament_id: room.tournament_id.clone(),
        tx,
        view: view.clone(),
    };

    let mut actor = RoomActor {
        room,
        ctx,
        catalog,
        clock,
        view,
    };
    actor.log_advance(first);
    if first == Advance::Closed {
        actor.finish();
    } else {
        tokio::spawn(actor.run(rx));
    }
    Ok(handle)
}

impl RoomActor {
    async fn run(mut self, mut rx: mpsc::Receiver<RoomCommand>) {
        loop {
            let wait = self
                .room
                .next_wake()
                .map(|at| (at - self.clock.now()).to_std().unwrap_or(Duration::ZERO));
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => {
                        log::debug!("[ROOM {}] all handles dropped, stopping", self.room.id);
                        break;
                    }
                },
                _ = sleep_for(wait) => {
                    if let Err(e) = self.tick() {
                        log::error!("[ROOM {}] timer tick failed: {e}", self.room.id);
                    }
                }
            }
            if self.room.status() == RoomStatus::Closed {
                self.finish();
                break;
            }
        }
    }

    fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Bid {
                bidder,
                amount,
                reply,
            } => {
                let _ = reply.send(self.bid(bidder, amount));
            }
            RoomCommand::Tick { reply } => {
                let _ = reply.send(self.tick());
            }
        }
    }

    fn bid(&mut self, bidder: ParticipantId, amount: Amount) -> Result<Bid> {
        let now = self.clock.now();
        let bid = {
            let tournament = self.ctx.lock();
            self.room.place_bid(&tournament, bidder, amount, now)?
        };
        self.ctx.log().append(LogRecord::BidAccepted {
            room_id: self.room.id.clone(),
            bid: bid.clone(),
        });
        log::debug!("[ROOM {}] bid {} by {}", self.room.id, amount, bidder);
        self.publish(now);
        Ok(bid)
    }

    fn tick(&mut self) -> Result<TickOutcome> {
        let now = self.clock.now();
        let outcome = {
            let mut tournament = self.ctx.lock();
            let outcome = self.room.tick(&mut tournament, now)?;
            // Logged under the tournament lock so the log order matches the
            // order in which ledgers were debited.
            if let TickOutcome::Settled { outcome, .. } = &outcome {
                self.ctx.log().append(LogRecord::LotSettled {
                    room_id: self.room.id.clone(),
                    outcome: outcome.clone(),
                    at: now,
                });
            }
            outcome
        };

        match &outcome {
            TickOutcome::Settled { outcome, next } => {
                self.log_settled(outcome);
                if matches!(outcome, LotOutcome::Sold { .. }) {
                    if let Err(e) = self.ctx.publish(now) {
                        log::error!("[ROOM {}] leaderboard not published: {e}", self.room.id);
                    }
                }
                self.log_advance(*next);
            }
            TickOutcome::Closing => {
                log::debug!("[ROOM {}] lot closing", self.room.id);
            }
            TickOutcome::Waiting => {}
        }
        self.publish(now);
        Ok(outcome)
    }

    fn publish(&self, now: DateTime<Utc>) {
        self.view.store(RoomView::of(&self.room, &self.catalog, now));
    }

    fn log_settled(&self, outcome: &LotOutcome) {
        match outcome {
            LotOutcome::Sold {
                player_id,
                winner,
                price,
                ..
            } => log::info!(
                "[ROOM {}] player {} sold to {} for {}",
                self.room.id,
                player_id,
                winner,
                price
            ),
            LotOutcome::Unsold {
                player_id,
                requeued,
            } => log::info!(
                "[ROOM {}] player {} unsold{}",
                self.room.id,
                player_id,
                if *requeued { ", requeued" } else { "" }
            ),
        }
    }

    fn log_advance(&self, advance: Advance) {
        if let Advance::Opened(player_id) = advance {
            log::info!("[ROOM {}] lot opened for player {}", self.room.id, player_id);
        }
    }

    /// Report the closed room to its tournament.
    fn finish(&mut self) {
        let now = self.clock.now();
        if let Some(summary) = self.room.summary() {
            log::info!(
                "[ROOM {}] closed: {} sold, {} unsold",
                self.room.id,
                summary.sold,
                summary.unsold
            );
        }
        let went_live = {
            let mut tournament = self.ctx.lock();
            lifecycle::mark_room_closed(&mut tournament, &self.room.id)
        };
        match went_live {
            Ok(true) => log::info!("[TOURNAMENT {}] all rooms closed, tournament is live", self.ctx.id),
            Ok(false) => {}
            Err(e) => log::error!("[ROOM {}] could not report closure: {e}", self.room.id),
        }
        if let Err(e) = self.ctx.publish(now) {
            log::error!("[ROOM {}] leaderboard not published: {e}", self.room.id);
        }
        self.publish(now);
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}
