//! Auction room state machine.
//!
//! `Idle -> LotOpen -> LotClosing -> {sold | unsold} -> LotOpen (next lot) | Closed`.
//!
//! The machine is synchronous and takes `now` explicitly. Every mutating call
//! also takes the tournament so that bidder snapshots and lot settlement read
//! and write the ledger in the same step as the room. The runtime layer runs
//! one machine per task and feeds it through a single queue.

use crate::error::{FantasyError, Result};
use crate::logic::{bid_validator, ledger};
use crate::models::{
    Amount, AuctionSettings, Bid, HighestBid, Lot, LotOutcome, ParticipantId,
    ParticipantSettlement, Player, PlayerId, QueuedPlayer, RoomId, RoomStatus, SettledLot,
    SettlementSummary, Tournament, TournamentId,
};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Result of advancing to the next lot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Advance {
    Opened(PlayerId),
    Closed,
}

/// Result of a timer tick.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// Nothing due yet.
    Waiting,
    /// The open lot entered its closing warning.
    Closing,
    /// The lot expired and was settled; the room advanced to `next`.
    Settled { outcome: LotOutcome, next: Advance },
}

#[derive(Clone, Debug)]
pub struct AuctionRoom {
    pub id: RoomId,
    pub tournament_id: TournamentId,
    settings: AuctionSettings,
    queue: VecDeque<QueuedPlayer>,
    status: RoomStatus,
    lot: Option<Lot>,
    results: Vec<SettledLot>,
    summary: Option<SettlementSummary>,
}

impl AuctionRoom {
    pub fn new(
        id: RoomId,
        tournament_id: TournamentId,
        settings: AuctionSettings,
        players: impl IntoIterator<Item = QueuedPlayer>,
    ) -> Self {
        Self {
            id,
            tournament_id,
            settings,
            queue: players.into_iter().collect(),
            status: RoomStatus::Idle,
            lot: None,
            results: Vec::new(),
            summary: None,
        }
    }

    /// Queue catalog players in the given order.
    pub fn with_players<'a>(
        id: RoomId,
        tournament_id: TournamentId,
        settings: AuctionSettings,
        players: impl IntoIterator<Item = &'a Player>,
    ) -> Self {
        let queue = players.into_iter().map(|p| QueuedPlayer {
            player_id: p.id,
            role: p.role,
            base_price: p.base_price,
            relists: 0,
        });
        Self::new(id, tournament_id, settings, queue)
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn settings(&self) -> &AuctionSettings {
        &self.settings
    }

    pub fn current_lot(&self) -> Option<&Lot> {
        self.lot.as_ref()
    }

    pub fn queued(&self) -> impl Iterator<Item = &QueuedPlayer> + '_ {
        self.queue.iter()
    }

    pub fn results(&self) -> &[SettledLot] {
        &self.results
    }

    pub fn summary(&self) -> Option<&SettlementSummary> {
        self.summary.as_ref()
    }

    /// Next instant at which `tick` has something to do.
    pub fn next_wake(&self) -> Option<DateTime<Utc>> {
        let lot = self.lot.as_ref()?;
        match self.status {
            RoomStatus::LotOpen => Some(lot.deadline - self.settings.closing_warning()),
            RoomStatus::LotClosing => Some(lot.deadline),
            RoomStatus::Idle | RoomStatus::Closed => None,
        }
    }

    /// Pop the next player and open a lot for it, or close the room.
    ///
    /// Players whose role nobody can still take are skipped. The room closes
    /// when the queue is empty or every participant's squad is complete.
    pub fn open_next_lot(&mut self, tournament: &Tournament, now: DateTime<Utc>) -> Result<Advance> {
        if self.status == RoomStatus::Closed {
            return Err(FantasyError::State(format!("room {} is closed", self.id)));
        }
        if self.lot.is_some() {
            return Err(FantasyError::State(format!(
                "room {} still has a lot open",
                self.id
            )));
        }

        let rules = &tournament.settings.squad_rules;
        let all_complete = !tournament.participants.is_empty()
            && tournament
                .participants
                .iter()
                .all(|p| ledger::squad_complete(rules, &p.squad));

        if !all_complete {
            while let Some(next) = self.queue.pop_front() {
                if !ledger::role_in_demand(tournament, next.role) {
                    continue;
                }
                let player_id = next.player_id;
                self.lot = Some(Lot::open(&next, now, now + self.settings.bid_timeout()));
                self.status = RoomStatus::LotOpen;
                return Ok(Advance::Opened(player_id));
            }
        }

        self.close(tournament, now);
        Ok(Advance::Closed)
    }

    /// Validate and apply a bid on the open lot.
    ///
    /// An accepted bid landing with less than the anti-snipe window left
    /// resets the deadline to a full `bid_timeout` from `now`.
    pub fn place_bid(
        &mut self,
        tournament: &Tournament,
        bidder: ParticipantId,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<Bid> {
        let status = self.status;
        let lot = match self.lot.as_mut() {
            Some(lot) if status.accepts_bids() => lot,
            _ => {
                return Err(FantasyError::State(format!(
                    "room {} has no lot open for bidding ({status:?})",
                    self.id
                )))
            }
        };
        if now >= lot.deadline {
            return Err(FantasyError::State(format!(
                "bidding on player {} closed at {}",
                lot.player_id, lot.deadline
            )));
        }

        let snapshot = ledger::snapshot(tournament, bidder, lot.role)?;
        bid_validator::validate(status, Some(&*lot), &snapshot, &self.settings, amount)?;

        let bid = Bid {
            bidder,
            amount,
            placed_at: now,
        };
        lot.history.push(bid.clone());
        lot.current_highest_bid = Some(HighestBid { bidder, amount });
        if lot.deadline - now < self.settings.anti_snipe_window() {
            lot.deadline = now + self.settings.bid_timeout();
        }
        self.status = if lot.deadline - now <= self.settings.closing_warning() {
            RoomStatus::LotClosing
        } else {
            RoomStatus::LotOpen
        };
        Ok(bid)
    }

    /// Drive the countdown: enter the closing warning or expire the lot.
    pub fn tick(&mut self, tournament: &mut Tournament, now: DateTime<Utc>) -> Result<TickOutcome> {
        let Some(deadline) = self.lot.as_ref().map(|l| l.deadline) else {
            return Ok(TickOutcome::Waiting);
        };
        if now >= deadline {
            return Ok(match self.timer_expire(tournament, now)? {
                Some((outcome, next)) => TickOutcome::Settled { outcome, next },
                None => TickOutcome::Waiting,
            });
        }
        if self.status == RoomStatus::LotOpen && deadline - now <= self.settings.closing_warning() {
            self.status = RoomStatus::LotClosing;
            return Ok(TickOutcome::Closing);
        }
        Ok(TickOutcome::Waiting)
    }

    /// Settle the open lot if its deadline has passed, then open the next one.
    ///
    /// Returns `None` (and changes nothing) when there is no open lot or the
    /// deadline has not been reached, e.g. a stale timer after a bid reset.
    pub fn timer_expire(
        &mut self,
        tournament: &mut Tournament,
        now: DateTime<Utc>,
    ) -> Result<Option<(LotOutcome, Advance)>> {
        if !self.status.accepts_bids() {
            return Ok(None);
        }
        match &self.lot {
            Some(lot) if now >= lot.deadline => {}
            _ => return Ok(None),
        }
        let Some(lot) = self.lot.take() else {
            return Ok(None);
        };

        let mut note = None;
        let outcome = match lot.current_highest_bid {
            Some(highest) => match ledger::settle_purchase(
                tournament,
                highest.bidder,
                lot.player_id,
                lot.role,
                highest.amount,
            ) {
                Ok(()) => LotOutcome::Sold {
                    player_id: lot.player_id,
                    role: lot.role,
                    winner: highest.bidder,
                    price: highest.amount,
                },
                Err(e) => {
                    note = Some(e.to_string());
                    self.unsold(&lot)
                }
            },
            None => self.unsold(&lot),
        };

        self.results.push(SettledLot {
            outcome: outcome.clone(),
            bids: lot.history.len(),
            settled_at: now,
            note,
        });
        let next = self.open_next_lot(tournament, now)?;
        Ok(Some((outcome, next)))
    }

    /// Re-queue at the tail while relists remain, otherwise drop.
    fn unsold(&mut self, lot: &Lot) -> LotOutcome {
        let requeued = lot.relists < self.settings.max_relists;
        if requeued {
            self.queue.push_back(QueuedPlayer {
                player_id: lot.player_id,
                role: lot.role,
                base_price: lot.base_price,
                relists: lot.relists + 1,
            });
        }
        LotOutcome::Unsold {
            player_id: lot.player_id,
            requeued,
        }
    }

    fn close(&mut self, tournament: &Tournament, now: DateTime<Utc>) {
        self.status = RoomStatus::Closed;
        self.lot = None;
        self.summary = Some(build_summary(&self.id, tournament, &self.results, now));
    }
}

/// Squad completion per participant after a room closes.
pub fn build_summary(
    room_id: &str,
    tournament: &Tournament,
    results: &[SettledLot],
    now: DateTime<Utc>,
) -> SettlementSummary {
    let rules = &tournament.settings.squad_rules;
    let participants = tournament
        .participants
        .iter()
        .map(|p| {
            let won: Vec<(PlayerId, Amount)> = results
                .iter()
                .filter_map(|r| match r.outcome {
                    LotOutcome::Sold {
                        player_id,
                        winner,
                        price,
                        ..
                    } if winner == p.id => Some((player_id, price)),
                    _ => None,
                })
                .collect();
            let missing = ledger::missing_roles(rules, &p.squad);
            ParticipantSettlement {
                participant_id: p.id,
                username: p.username.clone(),
                players_won: won.iter().map(|(id, _)| *id).collect(),
                spent: won.iter().map(|(_, price)| *price).sum(),
                budget_remaining: p.budget_remaining,
                squad_complete: missing.is_empty(),
                missing,
            }
        })
        .collect();
    let sold = results
        .iter()
        .filter(|r| matches!(r.outcome, LotOutcome::Sold { .. }))
        .count();
    SettlementSummary {
        room_id: room_id.to_string(),
        tournament_id: tournament.id.clone(),
        sold,
        unsold: results.len() - sold,
        participants,
        closed_at: now,
    }
}
