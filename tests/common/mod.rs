//! Shared integration-test harness: a real server on an ephemeral port
//! over a throwaway SQLite database.

use bugboard_backend::api::bugs::BugStore;
use bugboard_backend::api::projects::ProjectStore;
use bugboard_backend::api::routes::create_router;
use bugboard_backend::api::AppState;
use bugboard_backend::auth::{JwtHandler, UserStore};
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_SECRET: &str = "integration-test-secret-key";

pub const ADMIN_EMAIL: &str = "admin@bugboard.local";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestServer {
    pub base_url: String,
    _db_dir: TempDir,
}

pub async fn spawn_server() -> TestServer {
    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("bugboard-test.db");
    let db_path = db_path.to_str().unwrap();

    let state = AppState {
        user_store: Arc::new(UserStore::new(db_path).unwrap()),
        bug_store: Arc::new(BugStore::new(db_path).unwrap()),
        project_store: Arc::new(ProjectStore::new(db_path).unwrap()),
        jwt: Arc::new(JwtHandler::new(TEST_SECRET.to_string())),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        _db_dir: db_dir,
    }
}

/// A token that is correctly signed but already past its expiry.
pub fn expired_token(subject: uuid::Uuid) -> String {
    JwtHandler::new(TEST_SECRET.to_string())
        .with_ttl_hours(-1)
        .issue(subject)
        .unwrap()
}
