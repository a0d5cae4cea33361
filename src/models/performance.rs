//! Performance events: sport-specific stat deltas for a player.

use crate::error::{FantasyError, Result};
use crate::models::player::{PlayerId, Sport};
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a performance event; re-deliveries share it.
pub type EventId = Uuid;

/// Largest absolute value accepted for any single stat in one delta.
pub const MAX_STAT_MAGNITUDE: i64 = 1_000_000;

/// Cricket stat delta. Missing fields count as zero.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CricketStats {
    pub runs: i64,
    pub wickets: i64,
    pub catches: i64,
    pub stumpings: i64,
    pub run_outs: i64,
    pub fifties: i64,
    pub centuries: i64,
    pub five_wickets: i64,
}

/// Kabaddi stat delta. Missing fields count as zero.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct KabaddiStats {
    pub raid_points: i64,
    pub tackle_points: i64,
    pub bonus_points: i64,
    pub all_out_bonus: i64,
    pub super_raid: i64,
    pub super_tackle: i64,
    pub empty_raid: i64,
    pub technical_point: i64,
}

/// A stat delta in the vocabulary of one sport.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sport", rename_all = "snake_case")]
pub enum StatDelta {
    Cricket(CricketStats),
    Kabaddi(KabaddiStats),
}

impl StatDelta {
    pub fn sport(&self) -> Sport {
        match self {
            StatDelta::Cricket(_) => Sport::Cricket,
            StatDelta::Kabaddi(_) => Sport::Kabaddi,
        }
    }

    /// Field name and value of every stat, in wire naming.
    pub fn fields(&self) -> [(&'static str, i64); 8] {
        match self {
            StatDelta::Cricket(s) => [
                ("runs", s.runs),
                ("wickets", s.wickets),
                ("catches", s.catches),
                ("stumpings", s.stumpings),
                ("runOuts", s.run_outs),
                ("fifties", s.fifties),
                ("centuries", s.centuries),
                ("fiveWickets", s.five_wickets),
            ],
            StatDelta::Kabaddi(s) => [
                ("raidPoints", s.raid_points),
                ("tacklePoints", s.tackle_points),
                ("bonusPoints", s.bonus_points),
                ("allOutBonus", s.all_out_bonus),
                ("superRaid", s.super_raid),
                ("superTackle", s.super_tackle),
                ("emptyRaid", s.empty_raid),
                ("technicalPoint", s.technical_point),
            ],
        }
    }

    /// Reject stats outside `-MAX_STAT_MAGNITUDE..=MAX_STAT_MAGNITUDE`.
    pub fn check_bounds(&self) -> Result<()> {
        match self
            .fields()
            .into_iter()
            .find(|(_, v)| v.unsigned_abs() > MAX_STAT_MAGNITUDE as u64)
        {
            Some((name, value)) => Err(FantasyError::validation(
                "performance",
                format!("{name} = {value} is outside +/-{MAX_STAT_MAGNITUDE}"),
            )),
            None => Ok(()),
        }
    }

    /// Parse an untagged JSON stat object in the vocabulary of `sport`.
    pub fn from_json(sport: Sport, value: serde_json::Value) -> Result<Self> {
        let parsed = match sport {
            Sport::Cricket => serde_json::from_value(value).map(StatDelta::Cricket),
            Sport::Kabaddi => serde_json::from_value(value).map(StatDelta::Kabaddi),
        };
        let delta =
            parsed.map_err(|e| FantasyError::validation("performance", e.to_string()))?;
        delta.check_bounds()?;
        Ok(delta)
    }
}

/// Append-only scoring input.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEvent {
    pub id: EventId,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub delta: StatDelta,
    pub recorded_at: DateTime<Utc>,
}

impl PerformanceEvent {
    pub fn new(
        tournament_id: impl Into<TournamentId>,
        player_id: PlayerId,
        delta: StatDelta,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id: tournament_id.into(),
            player_id,
            delta,
            recorded_at,
        }
    }
}
