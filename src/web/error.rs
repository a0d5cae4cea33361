use crate::error::FantasyError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl ResponseError for FantasyError {
    fn status_code(&self) -> StatusCode {
        match self {
            FantasyError::Validation { .. } => StatusCode::BAD_REQUEST,
            FantasyError::NotFound { .. } => StatusCode::NOT_FOUND,
            FantasyError::Capacity(_) | FantasyError::State(_) => StatusCode::CONFLICT,
            FantasyError::ExternalService(_) => StatusCode::SERVICE_UNAVAILABLE,
            FantasyError::Inconsistent { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        })
    }
}

/// Extractor failures (bad JSON, bad path segment) become validation errors.
pub fn payload_error(err: impl std::fmt::Display) -> actix_web::Error {
    FantasyError::validation("body", err.to_string()).into()
}
