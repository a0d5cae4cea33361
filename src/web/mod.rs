//! HTTP surface: actix-web handlers, request/response bodies and error mapping.

mod dto;
mod error;
mod handlers;

use crate::predictor::Predictor;
use crate::runtime::Registry;
use actix_web::web::{self, ServiceConfig};
use std::sync::Arc;
use std::time::Duration;

pub use error::payload_error;

/// Shared application state handed to every handler.
pub struct AppState {
    pub registry: Arc<Registry>,
    pub predictor: Arc<dyn Predictor>,
    /// Upper bound on any single AI collaborator call.
    pub ai_timeout: Duration,
}

/// Register all routes and the extractor error handlers.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| payload_error(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _| payload_error(err)))
        .service(handlers::api_health)
        .service(handlers::api_list_tournaments)
        .service(handlers::api_create_tournament)
        .service(handlers::api_get_tournament)
        .service(handlers::api_participants)
        .service(handlers::api_open_registration)
        .service(handlers::api_join)
        .service(handlers::api_entry_fee)
        .service(handlers::api_start_auction)
        .service(handlers::api_complete)
        .service(handlers::api_performance)
        .service(handlers::api_leaderboard)
        .service(handlers::api_recover)
        .service(handlers::api_room)
        .service(handlers::api_bid)
        .service(handlers::api_players)
        .service(handlers::api_kabaddi_players)
        .service(handlers::api_real_tournaments)
        .service(handlers::api_real_kabaddi_tournaments)
        .service(handlers::api_predict)
        .service(handlers::api_simulate);
}
