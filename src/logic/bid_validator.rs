//! Accept or reject a proposed bid. Pure; no side effects.

use crate::error::{FantasyError, Result};
use crate::logic::ledger::LedgerSnapshot;
use crate::models::{Amount, AuctionSettings, Lot, RoomStatus};

/// Lowest amount that would currently be accepted on `lot`.
pub fn floor(lot: &Lot, settings: &AuctionSettings) -> Amount {
    match lot.current_highest_bid {
        Some(highest) => highest.amount.saturating_add(settings.bid_increment),
        None if settings.base_price_floor => settings.minimum_bid.max(lot.base_price),
        None => settings.minimum_bid,
    }
}

/// Rules, in order:
///
/// 1. the room must have a lot open (`LotOpen` or `LotClosing`), else `State`;
/// 2. the bidder must have room left in the lot's role, else `Capacity`;
/// 3. the bidder must be able to cover `amount` outright, else `Validation`;
/// 4. an opening bid must reach `minimum_bid`, else `Validation`;
/// 5. a raise must reach the highest bid plus one full increment, else `Validation`.
pub fn validate(
    status: RoomStatus,
    lot: Option<&Lot>,
    ledger: &LedgerSnapshot,
    settings: &AuctionSettings,
    amount: Amount,
) -> Result<()> {
    let lot = match lot {
        Some(lot) if status.accepts_bids() => lot,
        _ => {
            return Err(FantasyError::State(format!(
                "no lot open for bidding ({status:?})"
            )))
        }
    };

    if ledger.role_full() {
        return Err(FantasyError::Capacity(format!(
            "squad already holds {} of {} allowed for role {}",
            ledger.role_owned, ledger.role_quota, lot.role
        )));
    }

    if ledger.budget_remaining < amount {
        return Err(FantasyError::validation(
            "amount",
            format!(
                "bid {amount} exceeds remaining budget {}",
                ledger.budget_remaining
            ),
        ));
    }

    let required = floor(lot, settings);
    if amount < required {
        let reason = match lot.current_highest_bid {
            None => format!("opening bid {amount} is below the minimum of {required}"),
            Some(highest) => format!(
                "bid {amount} must be at least {required} (highest {} + increment {})",
                highest.amount, settings.bid_increment
            ),
        };
        return Err(FantasyError::validation("amount", reason));
    }

    Ok(())
}
