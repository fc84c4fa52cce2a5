use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Crate-wide error taxonomy. Every failure a handler can surface maps onto
/// one of these; the HTTP layer renders them as `{"error", "message"}` JSON.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "Already clocked in today")]
    AlreadyClockedIn,

    #[display(fmt = "No open session found for today")]
    NoOpenSession,

    #[display(fmt = "Attendance record already exists for this employee and date")]
    DuplicateRecord,

    #[display(fmt = "Request is not pending and cannot be decided")]
    InvalidTransition,

    #[display(fmt = "{}", _0)]
    Forbidden(&'static str),

    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),

    #[display(fmt = "Internal Server Error")]
    Database(sqlx::Error),
}

impl ApiError {
    /// Machine-readable error code, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::AlreadyClockedIn => "AlreadyClockedIn",
            ApiError::NoOpenSession => "NoOpenSession",
            ApiError::DuplicateRecord => "DuplicateRecord",
            ApiError::InvalidTransition => "InvalidTransition",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Database(_) => "Internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::AlreadyClockedIn
            | ApiError::NoOpenSession
            | ApiError::DuplicateRecord
            | ApiError::InvalidTransition => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Database(e) = self {
            tracing::error!(error = %e, "Database failure");
        }

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Database(e)
    }
}
