//! Append-only record of accepted bids, settled lots and performance events.
//!
//! Budgets, squads and leaderboard totals are all derived from these records,
//! so `recover` can rebuild them by replay.

use crate::models::{Bid, LotOutcome, PerformanceEvent, RoomId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogRecord {
    BidAccepted {
        room_id: RoomId,
        bid: Bid,
    },
    LotSettled {
        room_id: RoomId,
        outcome: LotOutcome,
        at: DateTime<Utc>,
    },
    Performance(PerformanceEvent),
}

#[derive(Debug, Default)]
pub struct AuditLog {
    records: Mutex<Vec<LogRecord>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lot outcomes in settlement order.
    pub fn settlements(&self) -> Vec<LotOutcome> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|r| match r {
                LogRecord::LotSettled { outcome, .. } => Some(outcome.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn performances(&self) -> Vec<PerformanceEvent> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|r| match r {
                LogRecord::Performance(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn bids(&self, room_id: &str) -> Vec<Bid> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|r| match r {
                LogRecord::BidAccepted { room_id: id, bid } if id == room_id => Some(bid.clone()),
                _ => None,
            })
            .collect()
    }
}
