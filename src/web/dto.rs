//! Request and response bodies.

use crate::models::{
    Amount, Bid, EventId, LeaderboardEntry, Participant, ParticipantId, PlayerId, RoomId, Sport,
    Tournament, TournamentSettingsInput,
};
use crate::predictor::TeamRoster;
use crate::runtime::RoomView;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentBody {
    #[serde(alias = "createdBy")]
    pub admin_id: String,
    #[serde(default)]
    pub sport: Sport,
    #[serde(default)]
    pub settings: TournamentSettingsInput,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinBody {
    pub user_id: String,
    #[serde(default)]
    pub user_data: UserData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFeeBody {
    pub user_id: String,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAuctionBody {
    #[serde(default)]
    pub room_count: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceBody {
    pub player_id: PlayerId,
    /// Sport-specific stat delta, checked against the tournament's sport.
    pub performance: serde_json::Value,
    #[serde(default)]
    pub event_id: Option<EventId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidBody {
    pub participant_id: ParticipantId,
    pub amount: Amount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictBody {
    pub team1: TeamRoster,
    pub team2: TeamRoster,
    #[serde(default = "default_match_type")]
    pub match_type: String,
}

fn default_match_type() -> String {
    "T20".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateBody {
    pub teams: Vec<TeamRoster>,
    #[serde(default = "default_tournament_type")]
    pub tournament_type: String,
}

fn default_tournament_type() -> String {
    "league".to_string()
}

#[derive(Serialize)]
pub struct TournamentResponse {
    pub success: bool,
    pub tournament: Tournament,
}

#[derive(Serialize)]
pub struct JoinResponse {
    pub success: bool,
    pub participant: Participant,
    pub tournament: Tournament,
}

#[derive(Serialize)]
pub struct AuctionStartedResponse {
    pub success: bool,
    pub tournament: Tournament,
    pub rooms: Vec<RoomId>,
}

#[derive(Serialize)]
pub struct PerformanceResponse {
    pub success: bool,
    /// False when the event id had already been recorded.
    pub applied: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Serialize)]
pub struct BidResponse {
    pub success: bool,
    pub bid: Bid,
    pub room: RoomView,
}
