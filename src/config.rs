//! Server configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Gemini REST endpoint used when `GEMINI_BASE_URL` is not set.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Bind address. 0.0.0.0 makes the server reachable from outside the host.
    pub host: String,
    pub port: u16,
    pub cricket_players_path: PathBuf,
    pub kabaddi_players_path: PathBuf,
    /// Unset leaves the AI collaborator unconfigured.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub ai_timeout: Duration,
    /// Completed tournaments idle this long are dropped by the cleanup task.
    pub retention: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cricket_players_path: PathBuf::from("data/cricket_players.csv"),
            kabaddi_players_path: PathBuf::from("data/kabaddi_players.csv"),
            gemini_api_key: None,
            gemini_model: "gemini-pro".to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            ai_timeout: Duration::from_secs(10),
            retention: Duration::from_secs(12 * 3600),
        }
    }
}

impl AppConfig {
    /// Read `HOST`, `PORT`, `CRICKET_PLAYERS_PATH`, `KABADDI_PLAYERS_PATH`,
    /// `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_BASE_URL`, `AI_TIMEOUT_SECS`
    /// and `RETENTION_HOURS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            cricket_players_path: std::env::var("CRICKET_PLAYERS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cricket_players_path),
            kabaddi_players_path: std::env::var("KABADDI_PLAYERS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.kabaddi_players_path),
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            ai_timeout: std::env::var("AI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.ai_timeout),
            retention: std::env::var("RETENTION_HOURS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(|h| Duration::from_secs(h * 3600))
                .unwrap_or(defaults.retention),
        }
    }
}
