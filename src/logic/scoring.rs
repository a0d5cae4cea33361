//! Fantasy points for a stat delta.

use crate::models::{CricketStats, KabaddiStats, StatDelta};

/// Pure, sport-aware points function injected into the leaderboard.
pub trait ScoringRule: Send + Sync {
    fn points(&self, delta: &StatDelta) -> i64;
}

impl<F> ScoringRule for F
where
    F: Fn(&StatDelta) -> i64 + Send + Sync,
{
    fn points(&self, delta: &StatDelta) -> i64 {
        self(delta)
    }
}

/// The platform's standard point tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardScoring;

impl ScoringRule for StandardScoring {
    fn points(&self, delta: &StatDelta) -> i64 {
        match delta {
            StatDelta::Cricket(stats) => cricket_points(stats),
            StatDelta::Kabaddi(stats) => kabaddi_points(stats),
        }
    }
}

/// Weighted stat sum, saturating at the i64 bounds.
fn weighted(terms: &[(i64, i64)]) -> i64 {
    terms
        .iter()
        .fold(0i64, |acc, &(value, weight)| {
            acc.saturating_add(value.saturating_mul(weight))
        })
}

pub fn cricket_points(s: &CricketStats) -> i64 {
    weighted(&[
        (s.runs, 1),
        (s.wickets, 25),
        (s.catches, 10),
        (s.stumpings, 15),
        (s.run_outs, 10),
        (s.fifties, 25),
        (s.centuries, 50),
        (s.five_wickets, 50),
    ])
}

pub fn kabaddi_points(s: &KabaddiStats) -> i64 {
    weighted(&[
        (s.raid_points, 2),
        (s.tackle_points, 3),
        (s.bonus_points, 1),
        (s.all_out_bonus, 10),
        (s.super_raid, 5),
        (s.super_tackle, 3),
        (s.empty_raid, -1),
        (s.technical_point, 1),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cricket_table() {
        let stats = CricketStats {
            runs: 85,
            wickets: 1,
            fifties: 1,
            ..Default::default()
        };
        assert_eq!(cricket_points(&stats), 85 + 25 + 25);
    }

    #[test]
    fn kabaddi_empty_raids_cost_a_point() {
        let stats = KabaddiStats {
            raid_points: 3,
            empty_raid: 2,
            ..Default::default()
        };
        assert_eq!(kabaddi_points(&stats), 6 - 2);
    }

    #[test]
    fn closures_are_scoring_rules() {
        let flat = |_: &StatDelta| -> i64 { 7 };
        let delta = StatDelta::Cricket(CricketStats::default());
        assert_eq!(flat.points(&delta), 7);
    }

    #[test]
    fn extreme_stats_saturate() {
        let stats = CricketStats {
            runs: i64::MAX,
            wickets: 1,
            ..Default::default()
        };
        assert_eq!(cricket_points(&stats), i64::MAX);
        let stats = KabaddiStats {
            empty_raid: i64::MIN,
            ..Default::default()
        };
        assert_eq!(kabaddi_points(&stats), i64::MAX);
    }
}
