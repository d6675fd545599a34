//! Project Records
//! Mission: SQLite-backed project storage and CRUD handlers

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

/// Project record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub manager_id: Option<Uuid>,
    pub created_at: String,
}

/// Create/update request body
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub manager_id: Option<Uuid>,
}

/// Project storage with SQLite backend
pub struct ProjectStore {
    db_path: String,
}

impl ProjectStore {
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
            "CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                manager_id TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Project>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, description, manager_id, created_at
             FROM projects ORDER BY created_at DESC",
        )?;

        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get(&self, id: i64) -> Result<Option<Project>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, description, manager_id, created_at
             FROM projects WHERE id = ?1",
        )?;

        match stmt.query_row(params![id], row_to_project) {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create(&self, req: &ProjectRequest) -> Result<Project> {
        let now = Utc::now().to_rfc3339();

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO projects (name, description, manager_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                req.name,
                req.description,
                req.manager_id.map(|u| u.to_string()),
                now,
            ],
        )
        .context("Failed to insert project")?;

        let id = conn.last_insert_rowid();

        Ok(Project {
            id,
            name: req.name.clone(),
            description: req.description.clone(),
            manager_id: req.manager_id,
            created_at: now,
        })
    }

    pub fn update(&self, id: i64, req: &ProjectRequest) -> Result<Option<Project>> {
        let Some(mut project) = self.get(id)? else {
            return Ok(None);
        };

        project.name = req.name.clone();
        project.description = req.description.clone();
        project.manager_id = req.manager_id;

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE projects SET name = ?2, description = ?3, manager_id = ?4 WHERE id = ?1",
            params![
                project.id,
                project.name,
                project.description,
                project.manager_id.map(|u| u.to_string()),
            ],
        )?;

        Ok(Some(project))
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            anyhow::bail!("Project not found");
        }

        info!("🗑️  Deleted project: {}", id);
        Ok(())
    }

    /// All projects managed by one user.
    pub fn list_by_manager(&self, user_id: &Uuid) -> Result<Vec<Project>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, description, manager_id, created_at
             FROM projects WHERE manager_id = ?1 ORDER BY created_at DESC",
        )?;

        let projects = stmt
            .query_map(params![user_id.to_string()], row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }
}

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    let manager_str: Option<String> = row.get(3)?;

    let manager_id = match manager_str {
        Some(s) => Some(Uuid::parse_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        manager_id,
        created_at: row.get(4)?,
    })
}

// ===== Route Handlers =====

/// List projects - GET /api/projects
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.project_store.list()?;
    Ok(Json(projects))
}

/// Get one project - GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, ApiError> {
    state
        .project_store
        .get(id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

/// Create a project - POST /api/projects (manager or admin)
pub async fn create_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name", "Name field is required"));
    }

    let project = state.project_store.create(&payload)?;

    info!("📁 Project #{} created by {}", project.id, identity.email);

    Ok((StatusCode::CREATED, Json(project)))
}

/// Update a project - PUT /api/projects/:id (manager or admin)
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name", "Name field is required"));
    }

    state
        .project_store
        .update(id, &payload)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

/// Delete a project - DELETE /api/projects/:id (manager or admin)
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.project_store.get(id)?.is_none() {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    state.project_store.delete(id)?;

    Ok(Json(json!({ "message": "Project removed" })))
}
