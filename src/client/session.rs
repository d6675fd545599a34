//! Client Session Persistence
//! Mission: One durable session, replaced whole or not at all

use crate::auth::models::{AuthResponse, Identity};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Well-known file name holding the serialized session.
pub const SESSION_FILE: &str = "userinfo.json";

/// The one piece of client state that outlives a process: the identity
/// subset the server handed back, plus the bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Identity,
    pub token: String,
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self {
            user: auth.user,
            token: auth.token,
        }
    }
}

/// File-backed session storage under the client state directory.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(SESSION_FILE),
        }
    }

    /// Read the persisted session, if any. An unreadable or corrupt
    /// file counts as "no session" rather than an error.
    pub fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Discarding corrupt session file {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Persist a session, replacing any previous one in full.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state dir {:?}", parent))?;
        }

        let raw = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write session file {:?}", self.path))?;

        Ok(())
    }

    /// Remove the persisted session. Missing file is fine.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove session file {:?}", self.path))
            }
        }
    }
}
