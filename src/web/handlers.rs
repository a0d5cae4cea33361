//! REST handlers under `/api`.

use super::dto::*;
use super::AppState;
use crate::catalog::real_tournaments;
use crate::error::FantasyError;
use crate::models::{RoomId, Sport, StatDelta, TournamentId};
use crate::predictor::{predict_or_unavailable, simulate_or_unavailable};
use actix_web::{
    get, post,
    web::{Data, Json, Path},
    HttpResponse,
};
use serde::Deserialize;

type State = Data<AppState>;
type ApiResult = Result<HttpResponse, FantasyError>;

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
pub struct TournamentPath {
    id: TournamentId,
}

/// Path segment: room id (e.g. /api/room/{room_id})
#[derive(Deserialize)]
pub struct RoomPath {
    room_id: RoomId,
}

#[get("/api/health")]
pub async fn api_health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "fantasy-league-web",
    })
}

#[get("/api/tournaments")]
pub async fn api_list_tournaments(state: State) -> HttpResponse {
    HttpResponse::Ok().json(state.registry.list_tournaments())
}

#[post("/api/tournaments")]
pub async fn api_create_tournament(state: State, body: Json<CreateTournamentBody>) -> ApiResult {
    let body = body.into_inner();
    let admin_id = body.admin_id.trim();
    if admin_id.is_empty() {
        return Err(FantasyError::validation("adminId", "must not be empty"));
    }
    let tournament = state
        .registry
        .create_tournament(admin_id, body.sport, body.settings)?;
    Ok(HttpResponse::Ok().json(TournamentResponse {
        success: true,
        tournament,
    }))
}

/// Full tournament with settings, status and participants (404 if not found).
#[get("/api/tournaments/{id}")]
pub async fn api_get_tournament(state: State, path: Path<TournamentPath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.registry.get_tournament(&path.id)?))
}

#[get("/api/tournaments/{id}/participants")]
pub async fn api_participants(state: State, path: Path<TournamentPath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.registry.participants(&path.id)?))
}

#[post("/api/tournaments/{id}/open")]
pub async fn api_open_registration(state: State, path: Path<TournamentPath>) -> ApiResult {
    let tournament = state.registry.open_registration(&path.id)?;
    Ok(HttpResponse::Ok().json(TournamentResponse {
        success: true,
        tournament,
    }))
}

#[post("/api/tournaments/{id}/join")]
pub async fn api_join(state: State, path: Path<TournamentPath>, body: Json<JoinBody>) -> ApiResult {
    let body = body.into_inner();
    let username = body.user_data.username.unwrap_or_default();
    let (participant, tournament) = state.registry.join(&path.id, &body.user_id, &username)?;
    Ok(HttpResponse::Ok().json(JoinResponse {
        success: true,
        participant,
        tournament,
    }))
}

#[post("/api/tournaments/{id}/entry-fee")]
pub async fn api_entry_fee(
    state: State,
    path: Path<TournamentPath>,
    body: Json<EntryFeeBody>,
) -> ApiResult {
    let tournament = state
        .registry
        .mark_entry_fee_paid(&path.id, &body.user_id)?;
    Ok(HttpResponse::Ok().json(TournamentResponse {
        success: true,
        tournament,
    }))
}

/// Body is optional; rooms default to one.
#[post("/api/tournaments/{id}/auction/start")]
pub async fn api_start_auction(
    state: State,
    path: Path<TournamentPath>,
    body: Option<Json<StartAuctionBody>>,
) -> ApiResult {
    let room_count = body.and_then(|b| b.room_count).unwrap_or(1);
    let (tournament, rooms) = state.registry.start_auction(&path.id, room_count)?;
    Ok(HttpResponse::Ok().json(AuctionStartedResponse {
        success: true,
        tournament,
        rooms,
    }))
}

#[post("/api/tournaments/{id}/complete")]
pub async fn api_complete(state: State, path: Path<TournamentPath>) -> ApiResult {
    let tournament = state.registry.complete(&path.id)?;
    Ok(HttpResponse::Ok().json(TournamentResponse {
        success: true,
        tournament,
    }))
}

#[post("/api/tournaments/{id}/performance")]
pub async fn api_performance(
    state: State,
    path: Path<TournamentPath>,
    body: Json<PerformanceBody>,
) -> ApiResult {
    let body = body.into_inner();
    let sport = state.registry.get_tournament(&path.id)?.sport;
    let delta = StatDelta::from_json(sport, body.performance)?;
    let (applied, snapshot) =
        state
            .registry
            .record_performance(&path.id, body.player_id, delta, body.event_id)?;
    Ok(HttpResponse::Ok().json(PerformanceResponse {
        success: true,
        applied,
        leaderboard: snapshot.entries.clone(),
    }))
}

/// Ranked entries, best first.
#[get("/api/tournaments/{id}/leaderboard")]
pub async fn api_leaderboard(state: State, path: Path<TournamentPath>) -> ApiResult {
    let snapshot = state.registry.leaderboard(&path.id)?;
    Ok(HttpResponse::Ok().json(&snapshot.entries))
}

/// Rebuild ledgers and scores from the log.
#[post("/api/tournaments/{id}/recover")]
pub async fn api_recover(state: State, path: Path<TournamentPath>) -> ApiResult {
    let snapshot = state.registry.recover(&path.id)?;
    Ok(HttpResponse::Ok().json(&*snapshot))
}

#[get("/api/room/{room_id}")]
pub async fn api_room(state: State, path: Path<RoomPath>) -> ApiResult {
    let view = state.registry.room_view(&path.room_id)?;
    Ok(HttpResponse::Ok().json(&*view))
}

#[post("/api/room/{room_id}/bid")]
pub async fn api_bid(state: State, path: Path<RoomPath>, body: Json<BidBody>) -> ApiResult {
    let room = state.registry.room(&path.room_id)?;
    let bid = room.place_bid(body.participant_id, body.amount).await?;
    Ok(HttpResponse::Ok().json(BidResponse {
        success: true,
        bid,
        room: (*room.view()).clone(),
    }))
}

#[get("/api/players")]
pub async fn api_players(state: State) -> HttpResponse {
    HttpResponse::Ok().json(state.registry.catalogs().cricket.players())
}

#[get("/api/kabaddi-players")]
pub async fn api_kabaddi_players(state: State) -> HttpResponse {
    HttpResponse::Ok().json(state.registry.catalogs().kabaddi.players())
}

#[get("/api/real-tournaments")]
pub async fn api_real_tournaments() -> HttpResponse {
    HttpResponse::Ok().json(real_tournaments(Sport::Cricket))
}

#[get("/api/real-kabaddi-tournaments")]
pub async fn api_real_kabaddi_tournaments() -> HttpResponse {
    HttpResponse::Ok().json(real_tournaments(Sport::Kabaddi))
}

#[post("/api/predict")]
pub async fn api_predict(state: State, body: Json<PredictBody>) -> ApiResult {
    let outcome = predict_or_unavailable(
        state.predictor.as_ref(),
        &body.team1,
        &body.team2,
        &body.match_type,
        state.ai_timeout,
    )
    .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/api/simulate-tournament")]
pub async fn api_simulate(state: State, body: Json<SimulateBody>) -> ApiResult {
    let outcome = simulate_or_unavailable(
        state.predictor.as_ref(),
        &body.teams,
        &body.tournament_type,
        state.ai_timeout,
    )
    .await?;
    Ok(HttpResponse::Ok().json(outcome))
}
