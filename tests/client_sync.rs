//! Integration tests for the client request-lifecycle core against a
//! live server: session persistence, slice transitions, and the
//! forced-logout cascade.

mod common;

use bugboard_backend::api::bugs::{BugRequest, BugStatus};
use bugboard_backend::api::users::CreateUserRequest;
use bugboard_backend::auth::models::RegisterRequest;
use bugboard_backend::client::{ApiClient, RequestStatus, Session, SessionStore};
use bugboard_backend::errors::{ErrorKind, TOKEN_FAILED_MESSAGE};
use common::{spawn_server, ADMIN_EMAIL, ADMIN_PASSWORD};

#[tokio::test]
async fn login_installs_and_persists_session() {
    let server = spawn_server().await;
    let state_dir = tempfile::tempdir().unwrap();

    let client = ApiClient::new(&server.base_url, state_dir.path()).unwrap();

    let identity = client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    assert!(identity.is_admin);

    // Slice moved pending -> succeeded with the identity payload
    let login_state = client.store.login.snapshot();
    assert_eq!(login_state.status, RequestStatus::Succeeded);
    assert_eq!(login_state.data.map(|i| i.email), Some(ADMIN_EMAIL.to_string()));

    // Session is live in memory and durable on disk
    assert_eq!(
        client.store.session().map(|s| s.user.id),
        Some(identity.id)
    );
    let persisted = SessionStore::new(state_dir.path()).load().unwrap();
    assert_eq!(persisted.user.id, identity.id);
}

#[tokio::test]
async fn failed_login_records_error_without_session() {
    let server = spawn_server().await;
    let state_dir = tempfile::tempdir().unwrap();

    let client = ApiClient::new(&server.base_url, state_dir.path()).unwrap();

    let err = client.login(ADMIN_EMAIL, "wrong").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);

    let login_state = client.store.login.snapshot();
    assert_eq!(login_state.status, RequestStatus::Failed);
    assert!(client.store.session().is_none());
    assert!(SessionStore::new(state_dir.path()).load().is_none());
}

#[tokio::test]
async fn expired_token_forces_logout_cascade() {
    let server = spawn_server().await;
    let state_dir = tempfile::tempdir().unwrap();

    // Establish who we are, then plant an expired token in the
    // persisted session, as if the client had been closed for a day.
    let bootstrap = ApiClient::new(&server.base_url, state_dir.path()).unwrap();
    let identity = bootstrap.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    SessionStore::new(state_dir.path())
        .save(&Session {
            user: identity.clone(),
            token: common::expired_token(identity.id),
        })
        .unwrap();

    let client = ApiClient::new(&server.base_url, state_dir.path()).unwrap();
    assert!(client.store.session().is_some());

    let err = client.list_bugs().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenRejected);
    assert_eq!(err.message, TOKEN_FAILED_MESSAGE);

    // The failing slice shows what happened...
    let bug_list = client.store.bug_list.snapshot();
    assert_eq!(bug_list.status, RequestStatus::Failed);
    assert_eq!(bug_list.error.map(|e| e.kind), Some(ErrorKind::TokenRejected));

    // ...and the session is gone everywhere, atomically
    assert!(client.store.session().is_none());
    assert!(SessionStore::new(state_dir.path()).load().is_none());

    // Other identity-scoped slices were reset
    assert_eq!(client.store.profile.snapshot().status, RequestStatus::Idle);
    assert_eq!(client.store.user_list.snapshot().status, RequestStatus::Idle);
}

#[tokio::test]
async fn forbidden_is_local_and_keeps_session() {
    let server = spawn_server().await;
    let state_dir = tempfile::tempdir().unwrap();

    let client = ApiClient::new(&server.base_url, state_dir.path()).unwrap();
    client
        .register(&RegisterRequest {
            name: "Plain".to_string(),
            email: "plain@example.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
        })
        .await
        .unwrap();

    // Admin-only call as a plain user
    let err = client
        .create_user(&CreateUserRequest {
            name: "X".to_string(),
            email: "x@example.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Forbidden);

    // The failure stayed local: slice failed, session intact
    let save_state = client.store.user_save.snapshot();
    assert_eq!(save_state.status, RequestStatus::Failed);
    assert!(client.store.session().is_some());
    assert!(SessionStore::new(state_dir.path()).load().is_some());
}

#[tokio::test]
async fn crud_round_trip_through_the_lifecycle() {
    let server = spawn_server().await;
    let state_dir = tempfile::tempdir().unwrap();

    let client = ApiClient::new(&server.base_url, state_dir.path()).unwrap();
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let bug = client
        .create_bug(&BugRequest {
            title: "Search is case-sensitive".to_string(),
            description: "Searching for 'Crash' misses 'crash'".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(bug.status, BugStatus::Open);

    let bugs = client.list_bugs().await.unwrap();
    assert_eq!(bugs.len(), 1);
    assert_eq!(
        client.store.bug_list.snapshot().status,
        RequestStatus::Succeeded
    );

    let updated = client
        .update_bug(
            bug.id,
            &BugRequest {
                title: bug.title.clone(),
                description: bug.description.clone(),
                status: Some(BugStatus::Resolved),
                project_id: None,
                assigned_to: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, BugStatus::Resolved);

    client.delete_bug(bug.id).await.unwrap();
    assert!(client.list_bugs().await.unwrap().is_empty());

    // Stale data from the earlier succeed stays visible on the detail
    // slice only until the next terminal transition; the delete slice
    // itself completed cleanly.
    assert_eq!(
        client.store.bug_delete.snapshot().status,
        RequestStatus::Succeeded
    );
}

#[tokio::test]
async fn explicit_logout_blocks_further_protected_calls() {
    let server = spawn_server().await;
    let state_dir = tempfile::tempdir().unwrap();

    let client = ApiClient::new(&server.base_url, state_dir.path()).unwrap();
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    client.list_bugs().await.unwrap();

    client.logout();

    assert!(client.store.session().is_none());
    assert_eq!(client.store.bug_list.snapshot().status, RequestStatus::Idle);

    // Without a session the call fails locally with no_token (no cascade)
    let err = client.list_bugs().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoToken);
}

#[tokio::test]
async fn profile_update_reissues_the_session() {
    let server = spawn_server().await;
    let state_dir = tempfile::tempdir().unwrap();

    let client = ApiClient::new(&server.base_url, state_dir.path()).unwrap();
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let updated = client
        .update_profile(&bugboard_backend::auth::models::ProfileUpdateRequest {
            name: "Head Admin".to_string(),
            email: ADMIN_EMAIL.to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Head Admin");

    // A fresh session was installed and the re-issued token still works
    let session = client.store.session().unwrap();
    assert_eq!(session.user.name, "Head Admin");
    assert!(!session.token.is_empty());

    let users = client.list_users().await.unwrap();
    assert!(!users.is_empty());
}
