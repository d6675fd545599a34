//! Authentication Module
//! Mission: Credential verification, token issuance, and role-gated access

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use jwt::{JwtHandler, VerificationError};
pub use middleware::{require_admin, require_auth, require_manager};
pub use models::Identity;
pub use user_store::UserStore;
