//! Rebuild derived state from the append-only logs.

use crate::error::Result;
use crate::logic::leaderboard::Aggregator;
use crate::logic::ledger;
use crate::logic::scoring::ScoringRule;
use crate::models::{LotOutcome, PerformanceEvent, Tournament};

/// Reset every ledger and re-apply the recorded sales in log order.
///
/// Unsold outcomes are ignored. Fails on the first sale the ledger rejects.
pub fn rebuild_ledger<'a>(
    tournament: &mut Tournament,
    outcomes: impl IntoIterator<Item = &'a LotOutcome>,
) -> Result<usize> {
    ledger::reset(tournament);
    let mut applied = 0;
    for outcome in outcomes {
        if let LotOutcome::Sold {
            player_id,
            role,
            winner,
            price,
        } = outcome
        {
            ledger::settle_purchase(tournament, *winner, *player_id, *role, *price)?;
            applied += 1;
        }
    }
    Ok(applied)
}

/// Re-fold every recorded performance event.
pub fn rebuild_aggregator<'a>(
    events: impl IntoIterator<Item = &'a PerformanceEvent>,
    scoring: &dyn ScoringRule,
) -> Result<Aggregator> {
    Aggregator::replay(events, scoring)
}
