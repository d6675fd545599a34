//! Authentication Models
//! Mission: Define secure user and identity data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub is_admin: bool,
    pub is_manager: bool,
    pub created_at: String,
}

/// The verified identity attached to a request after authentication,
/// and the subset of the account a client is allowed to hold on to.
///
/// Role flags here are a point-in-time read of the user store, not a
/// decode of the token payload, so role edits apply on the next request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_manager: bool,
}

impl Identity {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            is_manager: user.is_manager,
        }
    }
}

/// JWT claims payload. Carries only the subject id and validity window.
/// Everything else about the user is re-resolved per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub iat: usize,  // issued-at timestamp
    pub exp: usize,  // expiration timestamp
}

/// Login request body
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Profile update request body. Empty password means "keep current".
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Response to login, registration, and profile updates: the identity
/// subset plus a fresh bearer token. Clients persist this verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: Identity,
    pub token: String,
}
