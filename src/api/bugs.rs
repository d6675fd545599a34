//! Bug Records
//! Mission: SQLite-backed bug storage and CRUD handlers

use crate::api::AppState;
use crate::auth::models::Identity;
use crate::errors::ApiError;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// Bug record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bug {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: BugStatus,
    pub project_id: Option<i64>,
    pub assigned_to: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

/// Bug workflow state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BugStatus {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "resolved")]
    Resolved,
}

impl BugStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BugStatus::Open => "open",
            BugStatus::InProgress => "in_progress",
            BugStatus::Resolved => "resolved",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(BugStatus::Open),
            "in_progress" => Some(BugStatus::InProgress),
            "resolved" => Some(BugStatus::Resolved),
            _ => None,
        }
    }
}

/// Create/update request body
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BugRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<BugStatus>,
    pub project_id: Option<i64>,
    pub assigned_to: Option<Uuid>,
}

/// Bug storage with SQLite backend
pub struct BugStore {
    db_path: String,
}

impl BugStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS bugs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'open',
                project_id INTEGER,
                assigned_to TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Bug>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, title, description, status, project_id, assigned_to, created_at, updated_at
             FROM bugs ORDER BY created_at DESC",
        )?;

        let bugs = stmt
            .query_map([], row_to_bug)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(bugs)
    }

    pub fn get(&self, id: i64) -> Result<Option<Bug>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, title, description, status, project_id, assigned_to, created_at, updated_at
             FROM bugs WHERE id = ?1",
        )?;

        match stmt.query_row(params![id], row_to_bug) {
            Ok(bug) => Ok(Some(bug)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create(&self, req: &BugRequest) -> Result<Bug> {
        let now = Utc::now().to_rfc3339();
        let status = req.status.unwrap_or(BugStatus::Open);

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO bugs (title, description, status, project_id, assigned_to, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                req.title,
                req.description,
                status.as_str(),
                req.project_id,
                req.assigned_to.map(|u| u.to_string()),
                now,
                now,
            ],
        )
        .context("Failed to insert bug")?;

        let id = conn.last_insert_rowid();

        Ok(Bug {
            id,
            title: req.title.clone(),
            description: req.description.clone(),
            status,
            project_id: req.project_id,
            assigned_to: req.assigned_to,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn update(&self, id: i64, req: &BugRequest) -> Result<Option<Bug>> {
        let Some(mut bug) = self.get(id)? else {
            return Ok(None);
        };

        bug.title = req.title.clone();
        bug.description = req.description.clone();
        if let Some(status) = req.status {
            bug.status = status;
        }
        bug.project_id = req.project_id;
        bug.assigned_to = req.assigned_to;
        bug.updated_at = Utc::now().to_rfc3339();

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE bugs
             SET title = ?2, description = ?3, status = ?4, project_id = ?5,
                 assigned_to = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                bug.id,
                bug.title,
                bug.description,
                bug.status.as_str(),
                bug.project_id,
                bug.assigned_to.map(|u| u.to_string()),
                bug.updated_at,
            ],
        )?;

        Ok(Some(bug))
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected = conn.execute("DELETE FROM bugs WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            anyhow::bail!("Bug not found");
        }

        info!("🗑️  Deleted bug: {}", id);
        Ok(())
    }

    /// All bugs assigned to one user.
    pub fn list_by_assignee(&self, user_id: &Uuid) -> Result<Vec<Bug>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, title, description, status, project_id, assigned_to, created_at, updated_at
             FROM bugs WHERE assigned_to = ?1 ORDER BY created_at DESC",
        )?;

        let bugs = stmt
            .query_map(params![user_id.to_string()], row_to_bug)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(bugs)
    }
}

fn row_to_bug(row: &Row) -> rusqlite::Result<Bug> {
    let status_str: String = row.get(3)?;
    let assigned_str: Option<String> = row.get(5)?;

    let assigned_to = match assigned_str {
        Some(s) => Some(Uuid::parse_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    Ok(Bug {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: BugStatus::from_str(&status_str).unwrap_or(BugStatus::Open),
        project_id: row.get(4)?,
        assigned_to,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

// ===== Route Handlers =====

/// List bugs - GET /api/bugs
pub async fn list_bugs(State(state): State<AppState>) -> Result<Json<Vec<Bug>>, ApiError> {
    let bugs = state.bug_store.list()?;
    Ok(Json(bugs))
}

/// Get one bug - GET /api/bugs/:id
pub async fn get_bug(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Bug>, ApiError> {
    state
        .bug_store
        .get(id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Bug not found".to_string()))
}

/// Create a bug - POST /api/bugs
pub async fn create_bug(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<BugRequest>,
) -> Result<(StatusCode, Json<Bug>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("title", "Title field is required"));
    }

    let bug = state.bug_store.create(&payload)?;

    info!("🐛 Bug #{} created by {}", bug.id, identity.email);

    Ok((StatusCode::CREATED, Json(bug)))
}

/// Update a bug - PUT /api/bugs/:id
pub async fn update_bug(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<BugRequest>,
) -> Result<Json<Bug>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("title", "Title field is required"));
    }

    state
        .bug_store
        .update(id, &payload)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Bug not found".to_string()))
}

/// Delete a bug - DELETE /api/bugs/:id (manager or admin)
pub async fn delete_bug(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.bug_store.get(id)?.is_none() {
        return Err(ApiError::NotFound("Bug not found".to_string()));
    }

    state.bug_store.delete(id)?;

    Ok(Json(json!({ "message": "Bug removed" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (BugStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = BugStore::new(temp_file.path().to_str().unwrap()).unwrap();
        (store, temp_file)
    }

    fn request(title: &str) -> BugRequest {
        BugRequest {
            title: title.to_string(),
            description: "something broke".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_get_bug() {
        let (store, _temp) = create_test_store();

        let bug = store.create(&request("Login page 500s")).unwrap();
        assert_eq!(bug.status, BugStatus::Open);

        let fetched = store.get(bug.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Login page 500s");
    }

    #[test]
    fn test_update_bug_status() {
        let (store, _temp) = create_test_store();

        let bug = store.create(&request("Flaky test")).unwrap();

        let mut req = request("Flaky test");
        req.status = Some(BugStatus::Resolved);
        let updated = store.update(bug.id, &req).unwrap().unwrap();
        assert_eq!(updated.status, BugStatus::Resolved);

        // Unknown id updates nothing
        assert!(store.update(9999, &req).unwrap().is_none());
    }

    #[test]
    fn test_delete_bug() {
        let (store, _temp) = create_test_store();

        let bug = store.create(&request("Short-lived")).unwrap();
        store.delete(bug.id).unwrap();

        assert!(store.get(bug.id).unwrap().is_none());
        assert!(store.delete(bug.id).is_err());
    }

    #[test]
    fn test_list_by_assignee() {
        let (store, _temp) = create_test_store();
        let assignee = Uuid::new_v4();

        let mut req = request("Mine");
        req.assigned_to = Some(assignee);
        store.create(&req).unwrap();
        store.create(&request("Unassigned")).unwrap();

        let mine = store.list_by_assignee(&assignee).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Mine");

        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(BugStatus::InProgress.as_str(), "in_progress");
        assert_eq!(BugStatus::from_str("resolved"), Some(BugStatus::Resolved));
        assert_eq!(BugStatus::from_str("nonsense"), None);
    }
}
