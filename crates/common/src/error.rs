//! Common error types and handling for Bifrost

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Bifrost gateway.
///
/// Every variant maps to exactly one HTTP status; responses carry the
/// message as a single plain-text line. Internal detail is logged, not sent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    RateLimit(String),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::Authorization(_) => StatusCode::FORBIDDEN,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::Unexpected(_) | Error::Database(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The plain-text line sent to the client.
    ///
    /// Server-side failures collapse to `internal error` unless the variant
    /// carries an operator-chosen message (e.g. `bad service endpoint`).
    pub fn client_message(&self) -> String {
        match self {
            Error::Unexpected(_) | Error::Database(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors with full context
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal server error");
        }

        (status, self.client_message()).into_response()
    }
}
