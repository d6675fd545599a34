//! User Administration
//! Mission: Admin-gated user management endpoints

use crate::api::bugs::Bug;
use crate::api::projects::Project;
use crate::api::AppState;
use crate::auth::models::Identity;
use crate::auth::user_store::hash_password;
use crate::errors::ApiError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Admin user-creation request, role flags included.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_manager: bool,
}

/// Admin user-update request. Empty password means "keep current".
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_manager: bool,
}

fn parse_user_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::validation("id", "Invalid user id"))
}

/// List all users - GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Identity>>, ApiError> {
    let users = state.user_store.list_users()?;
    let sanitized: Vec<Identity> = users.iter().map(Identity::from_user).collect();
    Ok(Json(sanitized))
}

/// Get one user - GET /api/users/:id (admin)
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Identity>, ApiError> {
    let user_id = parse_user_id(&id)?;

    state
        .user_store
        .get_user_by_id(&user_id)?
        .map(|u| Json(Identity::from_user(&u)))
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Create a user with role flags - POST /api/users/create (admin)
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Identity>), ApiError> {
    let mut errors = HashMap::new();
    if payload.name.trim().is_empty() {
        errors.insert("name".to_string(), "Name field is required".to_string());
    }
    if payload.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email field is required".to_string());
    }
    if payload.password.len() < 6 {
        errors.insert(
            "password".to_string(),
            "Password must be at least 6 characters".to_string(),
        );
    } else if payload.password != payload.confirm_password {
        errors.insert(
            "confirm_password".to_string(),
            "Passwords must match".to_string(),
        );
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if state.user_store.get_user_by_email(&payload.email)?.is_some() {
        return Err(ApiError::validation(
            "email",
            "User email is already registered",
        ));
    }

    let user = state.user_store.create_user(
        &payload.name,
        &payload.email,
        &payload.password,
        payload.is_admin,
        payload.is_manager,
    )?;

    Ok((StatusCode::CREATED, Json(Identity::from_user(&user))))
}

/// Update a user, role flags included - PUT /api/users/:id (admin)
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Identity>, ApiError> {
    let user_id = parse_user_id(&id)?;

    let mut user = state
        .user_store
        .get_user_by_id(&user_id)?
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
    user.is_admin = payload.is_admin;
    user.is_manager = payload.is_manager;

    state.user_store.update_user(&user)?;

    info!("✅ User updated: {} (admin={}, manager={})", user.email, user.is_admin, user.is_manager);

    Ok(Json(Identity::from_user(&user)))
}

/// Delete a user - DELETE /api/users/:id (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = parse_user_id(&id)?;

    if user_id == identity.id {
        return Err(ApiError::validation(
            "id",
            "Cannot delete your own account",
        ));
    }

    if state.user_store.get_user_by_id(&user_id)?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state.user_store.delete_user(&user_id)?;

    Ok(Json(json!({ "message": "User removed" })))
}

/// Bugs assigned to a user - GET /api/users/:id/bugs (admin)
pub async fn list_assignee_bugs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Bug>>, ApiError> {
    let user_id = parse_user_id(&id)?;
    let bugs = state.bug_store.list_by_assignee(&user_id)?;
    Ok(Json(bugs))
}

/// Projects managed by a user - GET /api/users/:id/projects (admin)
pub async fn list_manager_projects(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let user_id = parse_user_id(&id)?;
    let projects = state.project_store.list_by_manager(&user_id)?;
    Ok(Json(projects))
}
