//! Access Middleware Chain
//! Mission: Authenticate bearer tokens and enforce role gates

use crate::api::AppState;
use crate::auth::models::Identity;
use crate::errors::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

fn admin_allowed(identity: &Identity) -> bool {
    identity.is_admin
}

fn manager_allowed(identity: &Identity) -> bool {
    identity.is_manager || identity.is_admin
}

/// Authentication gate for protected route groups.
///
/// Verifies the bearer token, then re-resolves the current identity
/// from the user store by subject id — not from the token payload — so
/// role edits take effect on the next request, not the next issuance.
/// On success the identity is attached to request extensions; nothing
/// outside the request is touched.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .map(str::to_string)
        .ok_or(ApiError::NoToken)?;

    let claims = state.jwt.verify(&token).map_err(|e| {
        warn!("❌ Token rejected: {}", e);
        ApiError::TokenRejected
    })?;

    let subject = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::TokenRejected)?;

    let user = state
        .user_store
        .get_user_by_id(&subject)?
        .ok_or_else(|| {
            warn!("❌ Token rejected: subject {} no longer exists", subject);
            ApiError::TokenRejected
        })?;

    req.extensions_mut().insert(Identity::from_user(&user));

    Ok(next.run(req).await)
}

/// Admin gate. Mounted only inside groups already layered with
/// `require_auth`, so a missing identity means authentication never ran.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let identity = req.extensions().get::<Identity>().ok_or(ApiError::NoToken)?;

    if !admin_allowed(identity) {
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}

/// Manager gate: managers and admins pass.
pub async fn require_manager(req: Request, next: Next) -> Result<Response, ApiError> {
    let identity = req.extensions().get::<Identity>().ok_or(ApiError::NoToken)?;

    if !manager_allowed(identity) {
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}
