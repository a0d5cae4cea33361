//! Single binary web server: REST API under /api, player catalogs from data/.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, and the
//! other variables read by `AppConfig::from_env`.

use actix_web::{web::Data, App, HttpServer};
use fantasy_league_web::predictor::{GeminiPredictor, Predictor, UnconfiguredPredictor};
use fantasy_league_web::web::{configure, AppState};
use fantasy_league_web::{AppConfig, Catalog, Catalogs, Registry, Sport};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// How often the cleanup task looks for stale completed tournaments.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

fn load_catalog(sport: Sport, path: &Path) -> Catalog {
    match Catalog::load(sport, path) {
        Ok(catalog) => {
            log::info!("Loaded {} {} players from {}", catalog.len(), sport, path.display());
            catalog
        }
        Err(e) => {
            log::warn!("No {} catalog from {}: {}", sport, path.display(), e);
            Catalog::empty(sport)
        }
    }
}

fn build_predictor(config: &AppConfig) -> Arc<dyn Predictor> {
    let Some(key) = config.gemini_api_key.as_deref() else {
        log::warn!("GEMINI_API_KEY not set; AI predictions will report unavailable");
        return Arc::new(UnconfiguredPredictor);
    };
    match GeminiPredictor::new(
        key,
        config.gemini_model.as_str(),
        config.gemini_base_url.as_str(),
        config.ai_timeout,
    ) {
        Ok(predictor) => Arc::new(predictor),
        Err(e) => {
            log::warn!("AI client could not be built ({e}); predictions will report unavailable");
            Arc::new(UnconfiguredPredictor)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    let catalogs = Catalogs::new(
        load_catalog(Sport::Cricket, &config.cricket_players_path),
        load_catalog(Sport::Kabaddi, &config.kabaddi_players_path),
    );
    let registry = Arc::new(Registry::with_catalogs(catalogs));
    let state = Data::new(AppState {
        registry: registry.clone(),
        predictor: build_predictor(&config),
        ai_timeout: config.ai_timeout,
    });

    // Background task: periodically drop completed tournaments idle past the retention
    let retention = chrono::Duration::from_std(config.retention)
        .unwrap_or_else(|_| chrono::Duration::hours(12));
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = registry.prune_completed(retention);
            if removed > 0 {
                log::info!("Cleaned up {} completed tournament(s)", removed);
            }
        }
    });

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(bind)?
        .run()
        .await
}
