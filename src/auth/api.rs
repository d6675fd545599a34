//! Authentication API Endpoints
//! Mission: Login, registration, and profile management

use crate::api::AppState;
use crate::auth::models::{
    AuthResponse, Identity, LoginRequest, ProfileUpdateRequest, RegisterRequest,
};
use crate::auth::user_store::hash_password;
use crate::errors::ApiError;
use axum::{extract::State, http::StatusCode, Extension, Json};
use std::collections::HashMap;
use tracing::{info, warn};

/// Login endpoint - POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!("🔐 Login attempt: {}", payload.email);

    validate_login(&payload)?;

    let valid = state
        .user_store
        .verify_password(&payload.email, &payload.password)?;

    if !valid {
        warn!("❌ Failed login attempt: {}", payload.email);
        return Err(ApiError::InvalidCredentials);
    }

    let user = state
        .user_store
        .get_user_by_email(&payload.email)?
        .ok_or(ApiError::InvalidCredentials)?;

    let token = state.jwt.issue(user.id)?;

    info!("✅ Login successful: {}", user.email);

    Ok(Json(AuthResponse {
        user: Identity::from_user(&user),
        token,
    }))
}

/// Registration endpoint - POST /api/users
/// New accounts carry no role flags; those are granted by an admin.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate_register(&payload)?;

    if state.user_store.get_user_by_email(&payload.email)?.is_some() {
        return Err(ApiError::validation(
            "email",
            "User email is already registered",
        ));
    }

    let user = state
        .user_store
        .create_user(&payload.name, &payload.email, &payload.password, false, false)?;

    let token = state.jwt.issue(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: Identity::from_user(&user),
            token,
        }),
    ))
}

/// Current user's profile - GET /api/users/profile
/// The identity in extensions is already a fresh store read.
pub async fn get_profile(Extension(identity): Extension<Identity>) -> Json<Identity> {
    Json(identity)
}

/// Update the current user's profile - PUT /api/users/profile
/// Re-issues a token because clients persist the returned identity.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_profile(&payload)?;

    let mut user = state
        .user_store
        .get_user_by_id(&identity.id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if payload.email != user.email {
        if state.user_store.get_user_by_email(&payload.email)?.is_some() {
            return Err(ApiError::validation(
                "email",
                "User email is already registered",
            ));
        }
        user.email = payload.email;
    }
    user.name = payload.name;
    if !payload.password.is_empty() {
        user.password_hash = hash_password(&payload.password)?;
    }

    state.user_store.update_user(&user)?;

    let token = state.jwt.issue(user.id)?;

    info!("✅ Profile updated: {}", user.email);

    Ok(Json(AuthResponse {
        user: Identity::from_user(&user),
        token,
    }))
}

fn validate_login(req: &LoginRequest) -> Result<(), ApiError> {
    let mut errors = HashMap::new();

    if req.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email field is required".to_string());
    }
    if req.password.is_empty() {
        errors.insert(
            "password".to_string(),
            "Password field is required".to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn validate_register(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = HashMap::new();

    if req.name.trim().is_empty() {
        errors.insert("name".to_string(), "Name field is required".to_string());
    }
    if req.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email field is required".to_string());
    }
    if req.password.len() < 6 {
        errors.insert(
            "password".to_string(),
            "Password must be at least 6 characters".to_string(),
        );
    } else if req.password != req.confirm_password {
        errors.insert(
            "confirm_password".to_string(),
            "Passwords must match".to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn validate_profile(req: &ProfileUpdateRequest) -> Result<(), ApiError> {
    let mut errors = HashMap::new();

    if req.name.trim().is_empty() {
        errors.insert("name".to_string(), "Name field is required".to_string());
    }
    if req.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email field is required".to_string());
    }
    if !req.password.is_empty() {
        if req.password.len() < 6 {
            errors.insert(
                "password".to_string(),
                "Password must be at least 6 characters".to_string(),
            );
        } else if req.password != req.confirm_password {
            errors.insert(
                "confirm_password".to_string(),
                "Passwords must match".to_string(),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}
