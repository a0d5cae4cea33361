//! Auction room, lot, bid and settlement records.

use crate::models::player::{PlayerId, Role};
use crate::models::tournament::{Amount, ParticipantId, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Short upper-case token, like tournament ids.
pub type RoomId = String;

/// Room lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Created, no lot opened yet.
    #[default]
    Idle,
    /// A lot is up for bid.
    LotOpen,
    /// A lot is up for bid and its countdown is in the closing warning.
    LotClosing,
    /// Queue exhausted; settlement summary published.
    Closed,
}

impl RoomStatus {
    /// Whether bids may be placed.
    pub fn accepts_bids(self) -> bool {
        matches!(self, RoomStatus::LotOpen | RoomStatus::LotClosing)
    }
}

/// An accepted bid. Never mutated once recorded.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub bidder: ParticipantId,
    pub amount: Amount,
    pub placed_at: DateTime<Utc>,
}

/// Current leader of a lot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighestBid {
    pub bidder: ParticipantId,
    pub amount: Amount,
}

/// A player waiting in a room's queue.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedPlayer {
    pub player_id: PlayerId,
    pub role: Role,
    pub base_price: Amount,
    /// Times this player already went unsold and was put back.
    pub relists: u32,
}

/// The single player currently up for bid in a room.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub player_id: PlayerId,
    pub role: Role,
    pub base_price: Amount,
    pub relists: u32,
    pub current_highest_bid: Option<HighestBid>,
    pub opened_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub history: Vec<Bid>,
}

impl Lot {
    pub fn open(player: &QueuedPlayer, opened_at: DateTime<Utc>, deadline: DateTime<Utc>) -> Self {
        Self {
            player_id: player.player_id,
            role: player.role,
            base_price: player.base_price,
            relists: player.relists,
            current_highest_bid: None,
            opened_at,
            deadline,
            history: Vec::new(),
        }
    }
}

/// How a lot ended.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LotOutcome {
    #[serde(rename_all = "camelCase")]
    Sold {
        player_id: PlayerId,
        role: Role,
        winner: ParticipantId,
        price: Amount,
    },
    #[serde(rename_all = "camelCase")]
    Unsold {
        player_id: PlayerId,
        /// Put back at the tail of the queue (otherwise dropped).
        requeued: bool,
    },
}

impl LotOutcome {
    pub fn player_id(&self) -> PlayerId {
        match self {
            LotOutcome::Sold { player_id, .. } | LotOutcome::Unsold { player_id, .. } => {
                *player_id
            }
        }
    }
}

/// A finished lot as recorded by its room.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledLot {
    #[serde(flatten)]
    pub outcome: LotOutcome,
    pub bids: usize,
    pub settled_at: DateTime<Utc>,
    /// Why a lot with a winning bid still ended unsold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Per-participant line of a room's final settlement summary.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSettlement {
    pub participant_id: ParticipantId,
    pub username: String,
    /// Players won in this room.
    pub players_won: Vec<PlayerId>,
    /// Spent in this room.
    pub spent: Amount,
    pub budget_remaining: Amount,
    pub squad_complete: bool,
    /// Roles still short of their quota, tournament-wide.
    pub missing: BTreeMap<Role, u32>,
}

/// Published when a room closes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSummary {
    pub room_id: RoomId,
    pub tournament_id: TournamentId,
    pub sold: usize,
    pub unsold: usize,
    pub participants: Vec<ParticipantSettlement>,
    pub closed_at: DateTime<Utc>,
}
