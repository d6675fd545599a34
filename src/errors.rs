//! API Error Taxonomy
//! Mission: One structured error vocabulary shared by server and client

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;

/// Machine-readable error tag carried in every error body.
///
/// Clients match on this tag rather than on message wording. The
/// `token_rejected` tag is what drives the forced-logout cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No credential presented on a protected route.
    NoToken,
    /// Credential presented but malformed, tampered, or expired.
    TokenRejected,
    /// Login failed. No session exists yet, so no cascade.
    InvalidCredentials,
    /// Authenticated but lacking the required role.
    Forbidden,
    /// Field-level validation failure.
    Validation,
    NotFound,
    Internal,
    /// Client-side transport failure. Never emitted by the server.
    Network,
}

impl ErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::NoToken => "no_token",
            ErrorKind::TokenRejected => "token_rejected",
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
            ErrorKind::Network => "network",
        }
    }

    /// Unknown tags collapse to `Internal` so old clients survive new servers.
    pub fn from_str(s: &str) -> Self {
        match s {
            "no_token" => ErrorKind::NoToken,
            "token_rejected" => ErrorKind::TokenRejected,
            "invalid_credentials" => ErrorKind::InvalidCredentials,
            "forbidden" => ErrorKind::Forbidden,
            "validation" => ErrorKind::Validation,
            "not_found" => ErrorKind::NotFound,
            "network" => ErrorKind::Network,
            _ => ErrorKind::Internal,
        }
    }
}

/// Canonical message for a rejected token. Kept stable: legacy clients
/// compare this string verbatim to decide on forced logout.
pub const TOKEN_FAILED_MESSAGE: &str = "Not authorized, token failed";

/// Canonical message for a missing credential.
pub const NO_TOKEN_MESSAGE: &str = "Not authorized, no token";

/// Server-side API error. Converts into a JSON response carrying both
/// the human-readable message and the machine-readable kind.
#[derive(Debug)]
pub enum ApiError {
    NoToken,
    TokenRejected,
    InvalidCredentials,
    Forbidden,
    Validation(HashMap<String, String>),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NoToken => ErrorKind::NoToken,
            ApiError::TokenRejected => ErrorKind::TokenRejected,
            ApiError::InvalidCredentials => ErrorKind::InvalidCredentials,
            ApiError::Forbidden => ErrorKind::Forbidden,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Single-field validation error, the common case.
    pub fn validation(field: &str, message: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), message.to_string());
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        let (status, message) = match &self {
            ApiError::NoToken => (StatusCode::UNAUTHORIZED, NO_TOKEN_MESSAGE.to_string()),
            ApiError::TokenRejected => {
                (StatusCode::UNAUTHORIZED, TOKEN_FAILED_MESSAGE.to_string())
            }
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
            }
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions".to_string()),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = match self {
            ApiError::Validation(errors) => Json(json!({
                "message": message,
                "kind": kind.as_str(),
                "errors": errors,
            })),
            _ => Json(json!({
                "message": message,
                "kind": kind.as_str(),
            })),
        };

        (status, body).into_response()
    }
}
