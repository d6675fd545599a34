//! HTTP API
//! Mission: Role-gated REST surface over the bug tracker stores

pub mod bugs;
pub mod projects;
pub mod routes;
pub mod users;

use crate::api::bugs::BugStore;
use crate::api::projects::ProjectStore;
use crate::auth::{JwtHandler, UserStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<UserStore>,
    pub bug_store: Arc<BugStore>,
    pub project_store: Arc<ProjectStore>,
    pub jwt: Arc<JwtHandler>,
}
