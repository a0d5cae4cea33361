//! Ranked leaderboard snapshot.

use crate::models::player::PlayerId;
use crate::models::tournament::{ParticipantId, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points earned by one owned player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPoints {
    pub player_id: PlayerId,
    pub points: i64,
}

/// One ranked row. Derived; never mutated on its own.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub participant_id: ParticipantId,
    pub username: String,
    pub total_points: i64,
    /// 1-based.
    pub rank: usize,
    pub players: Vec<PlayerPoints>,
}

/// Immutable, fully computed leaderboard for a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardSnapshot {
    pub tournament_id: TournamentId,
    /// Increases with every publish.
    pub version: u64,
    /// Distinct performance events folded in.
    pub events: usize,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<LeaderboardEntry>,
}

impl LeaderboardSnapshot {
    pub fn empty(tournament_id: impl Into<TournamentId>, generated_at: DateTime<Utc>) -> Self {
        Self {
            tournament_id: tournament_id.into(),
            version: 0,
            events: 0,
            generated_at,
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, participant_id: ParticipantId) -> Option<&LeaderboardEntry> {
        self.entries
            .iter()
            .find(|e| e.participant_id == participant_id)
    }
}
