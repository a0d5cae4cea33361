//! Error taxonomy shared by every layer.

use crate::models::TournamentId;

/// Errors returned by store, auction and leaderboard operations.
///
/// The first four variants describe caller or input mistakes and are never
/// retried. `ExternalService` only ever comes out of the AI collaborator and is
/// turned into an "unavailable" result before it reaches a client.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FantasyError {
    /// Malformed settings, payload or bid.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Unknown tournament, room, participant or player.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Participant cap or squad-role quota exceeded.
    #[error("capacity exceeded: {0}")]
    Capacity(String),

    /// Operation not valid for the current lifecycle state.
    #[error("invalid state: {0}")]
    State(String),

    /// AI collaborator timed out, failed or is not configured.
    #[error("external service unavailable: {0}")]
    ExternalService(String),

    /// A core invariant was found violated; the tournament is quarantined.
    #[error("tournament {tournament} is inconsistent: {reason}")]
    Inconsistent {
        tournament: TournamentId,
        reason: String,
    },
}

impl FantasyError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FantasyError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        FantasyError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Taxonomy tag used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            FantasyError::Validation { .. } => "ValidationError",
            FantasyError::NotFound { .. } => "NotFoundError",
            FantasyError::Capacity(_) => "CapacityError",
            FantasyError::State(_) => "StateError",
            FantasyError::ExternalService(_) => "ExternalServiceError",
            FantasyError::Inconsistent { .. } => "InconsistentStateError",
        }
    }
}

pub type Result<T> = std::result::Result<T, FantasyError>;
