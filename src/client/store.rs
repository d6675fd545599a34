//! Client State Store
//! Mission: Session ownership and the forced-logout cascade

use crate::api::bugs::Bug;
use crate::api::projects::Project;
use crate::auth::models::Identity;
use crate::client::lifecycle::{Operation, OperationSlice, RemoteError};
use crate::client::session::{Session, SessionStore};
use parking_lot::RwLock;
use tracing::{info, warn};

/// Holds the session plus one `Operation` slice per logical remote
/// call. Created once at client startup; the session file is read a
/// single time here to seed the in-memory state.
///
/// The session is only ever replaced wholesale: `install_session` and
/// `logout` swap the entire value, so no observer can see a
/// half-authenticated state.
pub struct ClientStore {
    session_store: SessionStore,
    session: RwLock<Option<Session>>,

    pub login: Operation<Identity>,
    pub register: Operation<Identity>,
    pub profile: Operation<Identity>,
    pub user_list: Operation<Vec<Identity>>,
    pub user_save: Operation<Identity>,
    pub user_delete: Operation<()>,
    pub bug_list: Operation<Vec<Bug>>,
    pub bug_detail: Operation<Bug>,
    pub bug_save: Operation<Bug>,
    pub bug_delete: Operation<()>,
    pub project_list: Operation<Vec<Project>>,
    pub project_detail: Operation<Project>,
    pub project_save: Operation<Project>,
    pub project_delete: Operation<()>,
}

impl ClientStore {
    pub fn new(session_store: SessionStore) -> Self {
        let initial = session_store.load();
        if let Some(session) = &initial {
            info!("🔑 Restored session for {}", session.user.email);
        }

        Self {
            session_store,
            session: RwLock::new(initial),
            login: Operation::new("login"),
            register: Operation::new("register"),
            profile: Operation::new("profile"),
            user_list: Operation::new("user_list"),
            user_save: Operation::new("user_save"),
            user_delete: Operation::new("user_delete"),
            bug_list: Operation::new("bug_list"),
            bug_detail: Operation::new("bug_detail"),
            bug_save: Operation::new("bug_save"),
            bug_delete: Operation::new("bug_delete"),
            project_list: Operation::new("project_list"),
            project_detail: Operation::new("project_detail"),
            project_save: Operation::new("project_save"),
            project_delete: Operation::new("project_delete"),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.token.clone())
    }

    /// Replace the session in full: persist, then publish.
    pub fn install_session(&self, session: Session) {
        if let Err(e) = self.session_store.save(&session) {
            warn!("Failed to persist session: {}", e);
        }
        *self.session.write() = Some(session);
    }

    /// Tear the session down in full: in-memory state, the persisted
    /// file, and every identity-scoped operation slice.
    pub fn logout(&self) {
        self.teardown_session(None);
        info!("👋 Session cleared");
    }

    /// Route a failure into its operation slice.
    ///
    /// This is where the cross-cutting rule lives: a token-rejected
    /// failure additionally triggers the global logout cascade. The
    /// failing slice keeps its `Failed` state so the caller can show
    /// what happened; every other identity-scoped slice is reset.
    /// Non-auth failures stay local to their slice.
    pub fn fail<T: Clone>(&self, op: &Operation<T>, error: RemoteError) {
        let cascade = error.is_token_rejected();
        op.fail(error);

        if cascade {
            warn!("🔒 Server rejected the session token - forcing logout");
            self.teardown_session(Some(op.name()));
        }
    }

    fn teardown_session(&self, keep_failed: Option<&'static str>) {
        *self.session.write() = None;
        if let Err(e) = self.session_store.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }

        // Login/register slices are pre-session and stay put.
        let identity_scoped: [&dyn OperationSlice; 12] = [
            &self.profile,
            &self.user_list,
            &self.user_save,
            &self.user_delete,
            &self.bug_list,
            &self.bug_detail,
            &self.bug_save,
            &self.bug_delete,
            &self.project_list,
            &self.project_detail,
            &self.project_save,
            &self.project_delete,
        ];

        for slice in identity_scoped {
            if Some(slice.name()) != keep_failed {
                slice.reset();
            }
        }
    }
}
