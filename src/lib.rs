//! Fantasy league web app: library with models, business logic, the room
//! runtime and the REST surface.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod predictor;
pub mod runtime;
pub mod web;

pub use catalog::{Catalog, CatalogError, Catalogs};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::{FantasyError, Result};
pub use logic::{AuctionRoom, ScoringRule, StandardScoring};
pub use models::{
    Participant, Player, PlayerId, Role, Sport, Tournament, TournamentId, TournamentStatus,
};
pub use runtime::Registry;
