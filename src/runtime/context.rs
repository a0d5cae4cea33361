//! Per-tournament context: the tournament itself, its score aggregate, the
//! published leaderboard and the append-only log.
//!
//! Lock order is `scores` before `tournament`. Room actors only ever take the
//! tournament lock, and never while holding anything else.

use crate::error::{FantasyError, Result};
use crate::logic::leaderboard::{self, Aggregator};
use crate::logic::{ledger, replay, ScoringRule};
use crate::models::{
    LeaderboardSnapshot, LotOutcome, PerformanceEvent, Tournament, TournamentId,
    TournamentStatus,
};
use crate::runtime::audit_log::{AuditLog, LogRecord};
use crate::runtime::snapshot::SnapshotCell;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Scores {
    aggregator: Aggregator,
    version: u64,
}

pub struct TournamentContext {
    pub id: TournamentId,
    tournament: Mutex<Tournament>,
    scores: Mutex<Scores>,
    leaderboard: SnapshotCell<LeaderboardSnapshot>,
    log: AuditLog,
    last_activity: Mutex<DateTime<Utc>>,
    scoring: Arc<dyn ScoringRule>,
}

impl TournamentContext {
    pub fn new(tournament: Tournament, scoring: Arc<dyn ScoringRule>, now: DateTime<Utc>) -> Self {
        let id = tournament.id.clone();
        let empty = LeaderboardSnapshot::empty(id.clone(), now);
        let ctx = Self {
            id,
            tournament: Mutex::new(tournament),
            scores: Mutex::new(Scores::default()),
            leaderboard: SnapshotCell::new(empty),
            log: AuditLog::new(),
            last_activity: Mutex::new(now),
            scoring,
        };
        // An imported tournament may already be inconsistent; publishing flags it.
        let _ = ctx.publish(now);
        ctx
    }

    /// Wrap an externally persisted tournament, seeding the log with its
    /// current squads so that replay reproduces them.
    pub fn imported(
        tournament: Tournament,
        scoring: Arc<dyn ScoringRule>,
        now: DateTime<Utc>,
    ) -> Self {
        let sales: Vec<LotOutcome> = tournament
            .participants
            .iter()
            .flat_map(|p| {
                p.squad.iter().map(move |(role, member)| LotOutcome::Sold {
                    player_id: member.player_id,
                    role,
                    winner: p.id,
                    price: member.price,
                })
            })
            .collect();
        let ctx = Self::new(tournament, scoring, now);
        for outcome in sales {
            ctx.log.append(LogRecord::LotSettled {
                room_id: "import".to_string(),
                outcome,
                at: now,
            });
        }
        ctx
    }

    /// Exclusive access to the tournament. Hold it only for synchronous work.
    pub fn lock(&self) -> MutexGuard<'_, Tournament> {
        self.tournament.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Tournament {
        self.lock().clone()
    }

    pub fn log(&self) -> &AuditLog {
        &self.log
    }

    pub fn touch(&self, now: DateTime<Utc>) {
        *self.last_activity.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current leaderboard, after verifying the tournament's invariants.
    pub fn leaderboard(&self) -> Result<Arc<LeaderboardSnapshot>> {
        {
            let mut tournament = self.lock();
            check(&mut tournament)?;
        }
        Ok(self.leaderboard.load())
    }

    /// Recompute and publish the leaderboard.
    pub fn publish(&self, now: DateTime<Utc>) -> Result<Arc<LeaderboardSnapshot>> {
        let mut scores = self.scores.lock().unwrap_or_else(|e| e.into_inner());
        self.publish_locked(&mut scores, now)
    }

    /// Apply a performance event. Returns whether it was new, and the
    /// leaderboard after it.
    pub fn record_performance(
        &self,
        event: PerformanceEvent,
        now: DateTime<Utc>,
    ) -> Result<(bool, Arc<LeaderboardSnapshot>)> {
        let mut scores = self.scores.lock().unwrap_or_else(|e| e.into_inner());
        {
            let mut tournament = self.lock();
            if tournament.status != TournamentStatus::Live {
                return Err(FantasyError::State(format!(
                    "tournament {} is not live ({:?})",
                    self.id, tournament.status
                )));
            }
            check(&mut tournament)?;
        }
        let applied = scores.aggregator.apply(&event, self.scoring.as_ref())?;
        if !applied {
            log::debug!("[TOURNAMENT {}] duplicate event {} ignored", self.id, event.id);
            return Ok((false, self.leaderboard.load()));
        }
        self.log.append(LogRecord::Performance(event));
        Ok((true, self.publish_locked(&mut scores, now)?))
    }

    /// Rebuild ledgers and scores from the log, clearing the inconsistent
    /// flag if the rebuilt state holds.
    pub fn recover(&self, now: DateTime<Utc>) -> Result<Arc<LeaderboardSnapshot>> {
        let mut scores = self.scores.lock().unwrap_or_else(|e| e.into_inner());
        scores.aggregator =
            replay::rebuild_aggregator(&self.log.performances(), self.scoring.as_ref()).map_err(
                |e| FantasyError::Inconsistent {
                    tournament: self.id.clone(),
                    reason: format!("score replay failed: {e}"),
                },
            )?;
        {
            let mut tournament = self.lock();
            let sales = replay::rebuild_ledger(&mut tournament, &self.log.settlements()).map_err(
                |e| FantasyError::Inconsistent {
                    tournament: self.id.clone(),
                    reason: format!("replay failed: {e}"),
                },
            )?;
            if let Err(reason) = ledger::check_invariants(&tournament) {
                tournament.inconsistent = Some(reason.clone());
                return Err(FantasyError::Inconsistent {
                    tournament: self.id.clone(),
                    reason,
                });
            }
            if tournament.inconsistent.take().is_some() {
                log::info!("[TOURNAMENT {}] recovered by replaying {sales} sale(s)", self.id);
            }
        }
        self.publish_locked(&mut scores, now)
    }

    fn publish_locked(
        &self,
        scores: &mut Scores,
        now: DateTime<Utc>,
    ) -> Result<Arc<LeaderboardSnapshot>> {
        let snapshot = {
            let mut tournament = self.lock();
            check(&mut tournament)?;
            scores.version += 1;
            leaderboard::snapshot(&tournament, &scores.aggregator, scores.version, now)
        };
        self.leaderboard.store(snapshot);
        Ok(self.leaderboard.load())
    }
}

/// Fail with `Inconsistent` if the tournament is flagged or its ledger
/// invariants no longer hold; a new violation sets the flag.
fn check(tournament: &mut Tournament) -> Result<()> {
    if let Some(reason) = &tournament.inconsistent {
        return Err(FantasyError::Inconsistent {
            tournament: tournament.id.clone(),
            reason: reason.clone(),
        });
    }
    if let Err(reason) = ledger::check_invariants(tournament) {
        log::error!(
            "[TOURNAMENT {}] invariant violated, tournament quarantined: {reason}",
            tournament.id
        );
        tournament.inconsistent = Some(reason.clone());
        return Err(FantasyError::Inconsistent {
            tournament: tournament.id.clone(),
            reason,
        });
    }
    Ok(())
}
