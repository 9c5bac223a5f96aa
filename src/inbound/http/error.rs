//! HTTP error payloads and mapping from domain errors.
//!
//! Keep the domain free of transport concerns by translating [`Error`]
//! into Actix responses here. This is the single boundary where the
//! taxonomy becomes status codes; anything unrecognised falls back to 500.

use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Error envelope for single-message failures: `{"error": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Error envelope for unclassified failures, carrying the best-effort
/// message alongside the generic marker.
#[derive(Debug, Serialize)]
struct InternalErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

/// Error envelope for validation failures with the per-field map.
#[derive(Debug, Serialize)]
struct ValidationErrorBody<'a> {
    error: &'a str,
    violations: &'a BTreeMap<String, String>,
}

/// Transport wrapper around the domain error taxonomy.
#[derive(Debug, Clone)]
pub struct ApiError(Error);

impl ApiError {
    /// Borrow the wrapped domain error.
    pub fn inner(&self) -> &Error {
        &self.0
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0.code() {
            ErrorCode::ValidationFailed | ErrorCode::InvalidReference => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match (self.0.code(), self.0.violations()) {
            (ErrorCode::ValidationFailed, Some(violations)) => {
                builder.json(ValidationErrorBody {
                    error: self.0.message(),
                    violations,
                })
            }
            (ErrorCode::Internal, _) => {
                error!(message = self.0.message(), "unclassified failure");
                builder.json(InternalErrorBody {
                    error: "Internal server error",
                    message: self.0.message(),
                })
            }
            _ => builder.json(ErrorBody {
                error: self.0.message(),
            }),
        }
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Map malformed JSON payloads onto the validation error envelope so
/// clients see a consistent body shape for every 400.
pub(crate) fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    ApiError::from(Error::new(ErrorCode::ValidationFailed, err.to_string())).into()
}
