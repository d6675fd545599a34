//! API Client
//! Mission: Feature actions that honor the request-lifecycle contract

use crate::api::bugs::{Bug, BugRequest};
use crate::api::projects::{Project, ProjectRequest};
use crate::api::users::{CreateUserRequest, UpdateUserRequest};
use crate::auth::models::{
    AuthResponse, Identity, LoginRequest, ProfileUpdateRequest, RegisterRequest,
};
use crate::client::lifecycle::{Operation, RemoteError};
use crate::client::session::{Session, SessionStore};
use crate::client::store::ClientStore;
use crate::errors::{ErrorKind, NO_TOKEN_MESSAGE, TOKEN_FAILED_MESSAGE};
use anyhow::{Context, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// HTTP client for the bugboard API.
///
/// Every method follows the same contract: dispatch `start` on its
/// operation slice before the call, attach the session token when the
/// endpoint is protected, and route every failure through the store's
/// `fail` so the forced-logout cascade can observe it.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    pub store: ClientStore,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    kind: Option<String>,
    errors: Option<HashMap<String, String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, state_dir: &Path) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store: ClientStore::new(SessionStore::new(state_dir)),
        })
    }

    // ===== Session actions =====

    /// Log in and install the returned session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, RemoteError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        self.store.login.start();
        match self
            .send::<AuthResponse>(
                Method::POST,
                "/api/users/login",
                Some(serde_json::json!(body)),
                false,
            )
            .await
        {
            Ok(auth) => {
                let identity = auth.user.clone();
                self.store.install_session(Session::from(auth));
                self.store.login.succeed(identity.clone());
                Ok(identity)
            }
            Err(err) => {
                self.store.fail(&self.store.login, err.clone());
                Err(err)
            }
        }
    }

    /// Register a new account; a successful registration logs in.
    pub async fn register(&self, req: &RegisterRequest) -> Result<Identity, RemoteError> {
        self.store.register.start();
        match self
            .send::<AuthResponse>(
                Method::POST,
                "/api/users",
                Some(serde_json::json!(req)),
                false,
            )
            .await
        {
            Ok(auth) => {
                let identity = auth.user.clone();
                self.store.install_session(Session::from(auth));
                self.store.register.succeed(identity.clone());
                Ok(identity)
            }
            Err(err) => {
                self.store.fail(&self.store.register, err.clone());
                Err(err)
            }
        }
    }

    /// Explicit logout: full session teardown, local only.
    pub fn logout(&self) {
        self.store.logout();
    }

    pub async fn get_profile(&self) -> Result<Identity, RemoteError> {
        self.run(&self.store.profile, async {
            self.send(Method::GET, "/api/users/profile", None, true).await
        })
        .await
    }

    /// Update the profile; the server re-issues a token, so the
    /// refreshed session replaces the stored one.
    pub async fn update_profile(&self, req: &ProfileUpdateRequest) -> Result<Identity, RemoteError> {
        self.store.profile.start();
        match self
            .send::<AuthResponse>(
                Method::PUT,
                "/api/users/profile",
                Some(serde_json::json!(req)),
                true,
            )
            .await
        {
            Ok(auth) => {
                let identity = auth.user.clone();
                self.store.install_session(Session::from(auth));
                self.store.profile.succeed(identity.clone());
                Ok(identity)
            }
            Err(err) => {
                self.store.fail(&self.store.profile, err.clone());
                Err(err)
            }
        }
    }

    // ===== User administration =====

    pub async fn list_users(&self) -> Result<Vec<Identity>, RemoteError> {
        self.run(&self.store.user_list, async {
            self.send(Method::GET, "/api/users", None, true).await
        })
        .await
    }

    pub async fn create_user(&self, req: &CreateUserRequest) -> Result<Identity, RemoteError> {
        self.run(&self.store.user_save, async {
            self.send(
                Method::POST,
                "/api/users/create",
                Some(serde_json::json!(req)),
                true,
            )
            .await
        })
        .await
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        req: &UpdateUserRequest,
    ) -> Result<Identity, RemoteError> {
        self.run(&self.store.user_save, async {
            self.send(
                Method::PUT,
                &format!("/api/users/{id}"),
                Some(serde_json::json!(req)),
                true,
            )
            .await
        })
        .await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), RemoteError> {
        self.run(&self.store.user_delete, async {
            self.send::<serde_json::Value>(Method::DELETE, &format!("/api/users/{id}"), None, true)
                .await
                .map(|_| ())
        })
        .await
    }

    // ===== Bugs =====

    pub async fn list_bugs(&self) -> Result<Vec<Bug>, RemoteError> {
        self.run(&self.store.bug_list, async {
            self.send(Method::GET, "/api/bugs", None, true).await
        })
        .await
    }

    pub async fn get_bug(&self, id: i64) -> Result<Bug, RemoteError> {
        self.run(&self.store.bug_detail, async {
            self.send(Method::GET, &format!("/api/bugs/{id}"), None, true)
                .await
        })
        .await
    }

    pub async fn create_bug(&self, req: &BugRequest) -> Result<Bug, RemoteError> {
        self.run(&self.store.bug_save, async {
            self.send(Method::POST, "/api/bugs", Some(serde_json::json!(req)), true)
                .await
        })
        .await
    }

    pub async fn update_bug(&self, id: i64, req: &BugRequest) -> Result<Bug, RemoteError> {
        self.run(&self.store.bug_save, async {
            self.send(
                Method::PUT,
                &format!("/api/bugs/{id}"),
                Some(serde_json::json!(req)),
                true,
            )
            .await
        })
        .await
    }

    pub async fn delete_bug(&self, id: i64) -> Result<(), RemoteError> {
        self.run(&self.store.bug_delete, async {
            self.send::<serde_json::Value>(Method::DELETE, &format!("/api/bugs/{id}"), None, true)
                .await
                .map(|_| ())
        })
        .await
    }

    // ===== Projects =====

    pub async fn list_projects(&self) -> Result<Vec<Project>, RemoteError> {
        self.run(&self.store.project_list, async {
            self.send(Method::GET, "/api/projects", None, true).await
        })
        .await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, RemoteError> {
        self.run(&self.store.project_detail, async {
            self.send(Method::GET, &format!("/api/projects/{id}"), None, true)
                .await
        })
        .await
    }

    pub async fn create_project(&self, req: &ProjectRequest) -> Result<Project, RemoteError> {
        self.run(&self.store.project_save, async {
            self.send(
                Method::POST,
                "/api/projects",
                Some(serde_json::json!(req)),
                true,
            )
            .await
        })
        .await
    }

    pub async fn update_project(
        &self,
        id: i64,
        req: &ProjectRequest,
    ) -> Result<Project, RemoteError> {
        self.run(&self.store.project_save, async {
            self.send(
                Method::PUT,
                &format!("/api/projects/{id}"),
                Some(serde_json::json!(req)),
                true,
            )
            .await
        })
        .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), RemoteError> {
        self.run(&self.store.project_delete, async {
            self.send::<serde_json::Value>(
                Method::DELETE,
                &format!("/api/projects/{id}"),
                None,
                true,
            )
            .await
            .map(|_| ())
        })
        .await
    }

    // ===== Plumbing =====

    /// Drive one operation slice through its lifecycle around a call.
    async fn run<T, Fut>(&self, op: &Operation<T>, call: Fut) -> Result<T, RemoteError>
    where
        T: Clone,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        op.start();
        match call.await {
            Ok(value) => {
                op.succeed(value.clone());
                Ok(value)
            }
            Err(err) => {
                self.store.fail(op, err.clone());
                Err(err)
            }
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        protected: bool,
    ) -> Result<T, RemoteError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url);

        if protected {
            let token = self
                .store
                .token()
                .ok_or_else(|| RemoteError::new(ErrorKind::NoToken, NO_TOKEN_MESSAGE))?;
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| RemoteError::network(e.to_string()))?;

        if resp.status().is_success() {
            resp.json::<T>().await.map_err(|e| {
                RemoteError::new(ErrorKind::Internal, format!("Invalid response body: {e}"))
            })
        } else {
            Err(parse_error(resp).await)
        }
    }
}

/// Turn a non-success response into a structured error.
async fn parse_error(resp: reqwest::Response) -> RemoteError {
    let status = resp.status();
    let body: ErrorBody = resp.json().await.unwrap_or_default();

    let message = body
        .message
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    let kind = match body.kind.as_deref() {
        Some(tag) => ErrorKind::from_str(tag),
        // Older servers send only the message; the canonical rejection
        // string still routes into the cascade, then status class.
        None if message == TOKEN_FAILED_MESSAGE => ErrorKind::TokenRejected,
        None => match status.as_u16() {
            400 => ErrorKind::Validation,
            401 => ErrorKind::InvalidCredentials,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        },
    };

    RemoteError {
        kind,
        message,
        field_errors: body.errors.unwrap_or_default(),
    }
}
