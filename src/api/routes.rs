//! Router Assembly
//! Mission: Wire routes to their role gates in one place

use crate::api::{bugs, projects, users, AppState};
use crate::auth::{api as auth_api, require_admin, require_auth, require_manager};
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

/// Create the API router.
///
/// Role gates are mounted as route groups: `require_admin` and
/// `require_manager` sit inside the authenticated group, so the
/// authentication layer always runs first.
pub fn create_router(state: AppState) -> Router {
    // Public routes (health check + login + registration)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/users/login", post(auth_api::login))
        .route("/api/users", post(auth_api::register));

    // Any authenticated user
    let authed_routes = Router::new()
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/profile",
            get(auth_api::get_profile).put(auth_api::update_profile),
        )
        .route("/api/bugs", get(bugs::list_bugs).post(bugs::create_bug))
        .route("/api/bugs/:id", get(bugs::get_bug).put(bugs::update_bug))
        .route("/api/projects", get(projects::list_projects))
        .route("/api/projects/:id", get(projects::get_project));

    // Managers and admins
    let manager_routes = Router::new()
        .route("/api/bugs/:id", delete(bugs::delete_bug))
        .route("/api/projects", post(projects::create_project))
        .route(
            "/api/projects/:id",
            put(projects::update_project).delete(projects::delete_project),
        )
        .route_layer(middleware::from_fn(require_manager));

    // Admins only
    let admin_routes = Router::new()
        .route("/api/users/create", post(users::create_user))
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/users/:id/bugs", get(users::list_assignee_bugs))
        .route("/api/users/:id/projects", get(users::list_manager_projects))
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = authed_routes
        .merge(manager_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
