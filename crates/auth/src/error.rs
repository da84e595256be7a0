//! Authentication error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors produced while validating requester credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The token is structurally broken, fails MAC verification, or its
    /// payload does not parse.
    #[error("invalid token")]
    InvalidToken,

    /// The token verified but its expiration instant has passed.
    #[error("token expired")]
    ExpiredToken,

    /// No credential was supplied where one is required.
    #[error("missing credentials")]
    MissingCredentials,

    /// The supplied credential does not map to a known user.
    #[error("unknown credentials")]
    UnknownCredentials,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "authentication rejected");
        // Clients only ever see the generic line; the distinction between
        // invalid, expired, and missing stays in the logs.
        (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
    }
}
