//! Leaderboard aggregation and ranking.
//!
//! Player totals are plain integer sums over a de-duplicated event set, so the
//! result depends only on which events were applied, never on their order.

use crate::error::{FantasyError, Result};
use crate::logic::scoring::ScoringRule;
use crate::models::{
    EventId, LeaderboardEntry, LeaderboardSnapshot, Participant, PerformanceEvent, PlayerId,
    PlayerPoints, Tournament,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Accumulated points per player for one tournament.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    seen: HashSet<EventId>,
    player_points: HashMap<PlayerId, i64>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one event. Returns false for an already-applied event id.
    ///
    /// An event that would overflow its player's total is rejected and
    /// leaves the aggregate untouched, so a corrected re-delivery still counts.
    pub fn apply(&mut self, event: &PerformanceEvent, scoring: &dyn ScoringRule) -> Result<bool> {
        if self.seen.contains(&event.id) {
            return Ok(false);
        }
        let current = self.points(event.player_id);
        let total = current
            .checked_add(scoring.points(&event.delta))
            .ok_or_else(|| {
                FantasyError::validation(
                    "performance",
                    format!("points for player {} would overflow", event.player_id),
                )
            })?;
        self.seen.insert(event.id);
        self.player_points.insert(event.player_id, total);
        Ok(true)
    }

    pub fn replay<'a>(
        events: impl IntoIterator<Item = &'a PerformanceEvent>,
        scoring: &dyn ScoringRule,
    ) -> Result<Self> {
        let mut aggregator = Self::new();
        for event in events {
            aggregator.apply(event, scoring)?;
        }
        Ok(aggregator)
    }

    pub fn points(&self, player_id: PlayerId) -> i64 {
        self.player_points.get(&player_id).copied().unwrap_or(0)
    }

    pub fn event_count(&self) -> usize {
        self.seen.len()
    }
}

/// Sum owned players' points per participant and rank them.
///
/// Order: total points descending, then join order ascending.
pub fn rank(participants: &[Participant], aggregator: &Aggregator) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(usize, LeaderboardEntry)> = participants
        .iter()
        .map(|p| {
            let players: Vec<PlayerPoints> = p
                .squad
                .player_ids()
                .map(|player_id| PlayerPoints {
                    player_id,
                    points: aggregator.points(player_id),
                })
                .collect();
            let entry = LeaderboardEntry {
                participant_id: p.id,
                username: p.username.clone(),
                total_points: players
                    .iter()
                    .fold(0i64, |acc, pp| acc.saturating_add(pp.points)),
                rank: 0,
                players,
            };
            (p.join_order, entry)
        })
        .collect();

    rows.sort_by(|(a_order, a), (b_order, b)| {
        b.total_points
            .cmp(&a.total_points)
            .then(a_order.cmp(b_order))
    });

    rows.into_iter()
        .enumerate()
        .map(|(i, (_, mut entry))| {
            entry.rank = i + 1;
            entry
        })
        .collect()
}

/// Build a complete snapshot of the tournament's leaderboard.
pub fn snapshot(
    tournament: &Tournament,
    aggregator: &Aggregator,
    version: u64,
    now: DateTime<Utc>,
) -> LeaderboardSnapshot {
    LeaderboardSnapshot {
        tournament_id: tournament.id.clone(),
        version,
        events: aggregator.event_count(),
        generated_at: now,
        entries: rank(&tournament.participants, aggregator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CricketStats, StatDelta};
    use chrono::Utc;

    fn runs(player_id: PlayerId, n: i64) -> PerformanceEvent {
        let delta = StatDelta::Cricket(CricketStats {
            runs: n,
            ..Default::default()
        });
        PerformanceEvent::new("T", player_id, delta, Utc::now())
    }

    #[test]
    fn overflowing_event_leaves_the_aggregate_untouched() {
        let huge = |d: &StatDelta| -> i64 {
            match d {
                StatDelta::Cricket(s) if s.runs > 0 => i64::MAX,
                _ => 1,
            }
        };
        let mut aggregator = Aggregator::new();
        assert!(aggregator.apply(&runs(1, 0), &huge).unwrap());
        let overflow = runs(1, 10);
        let err = aggregator.apply(&overflow, &huge).unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert_eq!(aggregator.points(1), 1);
        assert_eq!(aggregator.event_count(), 1);

        // The rejected id was not marked as seen.
        let four = |_: &StatDelta| -> i64 { 4 };
        assert!(aggregator.apply(&overflow, &four).unwrap());
        assert_eq!(aggregator.points(1), 5);
    }
}
