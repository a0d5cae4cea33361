//! Data structures: catalog players, tournaments, auctions, performance and leaderboard.

mod auction;
mod leaderboard;
mod performance;
mod player;
mod tournament;

pub use auction::{
    Bid, HighestBid, Lot, LotOutcome, ParticipantSettlement, QueuedPlayer, RoomId, RoomStatus,
    SettledLot, SettlementSummary,
};
pub use leaderboard::{LeaderboardEntry, LeaderboardSnapshot, PlayerPoints};
pub use performance::{
    CricketStats, EventId, KabaddiStats, PerformanceEvent, StatDelta, MAX_STAT_MAGNITUDE,
};
pub use player::{Player, PlayerId, Role, Sport};
pub use tournament::{
    Amount, AuctionSettings, Participant, ParticipantId, RoomRef, Squad, SquadMember, SquadRules,
    Tournament, TournamentId, TournamentSettings, TournamentSettingsInput, TournamentStatus,
    TournamentSummary, UserId, CLOSING_WARNING_SECS, MAX_BID_TIMEOUT_SECS,
};
