//! Business logic: setup, registration, lifecycle, ledger, bidding, rooms, scoring.
//!
//! Everything here is synchronous and works on plain model values; the
//! runtime layer decides where locks and tasks go.

pub mod bid_validator;
pub mod leaderboard;
pub mod ledger;
pub mod lifecycle;
pub mod registration;
pub mod replay;
pub mod room;
pub mod scoring;
pub mod setup;

pub use leaderboard::{rank, Aggregator};
pub use ledger::{check_invariants, settle_purchase, LedgerSnapshot};
pub use lifecycle::{begin_auction, complete, mark_room_closed, open_registration};
pub use registration::{join, mark_entry_fee_paid};
pub use room::{Advance, AuctionRoom, TickOutcome};
pub use scoring::{ScoringRule, StandardScoring};
pub use setup::{create_tournament, resolve_settings};
