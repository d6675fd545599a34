//! Credential Store
//! Mission: Securely store and manage user accounts with SQLite

use crate::auth::models::User;
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::{info, warn};
use uuid::Uuid;

/// Hash a plaintext password with bcrypt.
pub fn hash_password(password: &str) -> Result<String> {
    hash(password, DEFAULT_COST).context("Failed to hash password")
}

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize the schema.
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
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0,
                is_manager INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.create_default_admin(&conn)?;

        Ok(())
    }

    /// Seed a default administrator so a fresh install is reachable.
    fn create_default_admin(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE is_admin = 1",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if count == 0 {
            let admin = User {
                id: Uuid::new_v4(),
                name: "Admin".to_string(),
                email: "admin@bugboard.local".to_string(),
                password_hash: hash_password("admin123")?,
                is_admin: true,
                is_manager: false,
                created_at: Utc::now().to_rfc3339(),
            };

            self.insert(conn, &admin)?;

            info!("🔐 Default admin user created (email: admin@bugboard.local, password: admin123)");
            warn!("⚠️  CHANGE DEFAULT PASSWORD IN PRODUCTION!");
        }

        Ok(())
    }

    fn insert(&self, conn: &Connection, user: &User) -> Result<()> {
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, is_admin, is_manager, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.is_admin,
                user.is_manager,
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;
        Ok(())
    }

    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, email, password_hash, is_admin, is_manager, created_at
             FROM users WHERE email = ?1",
        )?;

        match stmt.query_row(params![email], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by id. This is the per-request identity resolution the
    /// authentication middleware relies on.
    pub fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, email, password_hash, is_admin, is_manager, created_at
             FROM users WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify email and password against the stored bcrypt hash.
    pub fn verify_password(&self, email: &str, password: &str) -> Result<bool> {
        match self.get_user_by_email(email)? {
            Some(user) => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid)
            }
            None => Ok(false),
        }
    }

    /// Create a new user
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        is_admin: bool,
        is_manager: bool,
    ) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            is_admin,
            is_manager,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        self.insert(&conn, &user)?;

        info!("✅ Created user: {} ({})", user.email, user.id);

        Ok(user)
    }

    /// Persist changes to an existing user (full-row replacement).
    pub fn update_user(&self, user: &User) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected = conn.execute(
            "UPDATE users
             SET name = ?2, email = ?3, password_hash = ?4, is_admin = ?5, is_manager = ?6
             WHERE id = ?1",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.is_admin,
                user.is_manager,
            ],
        )?;

        if rows_affected == 0 {
            anyhow::bail!("User not found");
        }

        Ok(())
    }

    /// List all users, newest first.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, email, password_hash, is_admin, is_manager, created_at
             FROM users ORDER BY created_at DESC",
        )?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Delete a user by id.
    pub fn delete_user(&self, user_id: &Uuid) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected = conn.execute(
            "DELETE FROM users WHERE id = ?1",
            params![user_id.to_string()],
        )?;

        if rows_affected == 0 {
            anyhow::bail!("User not found");
        }

        info!("🗑️  Deleted user: {}", user_id);
        Ok(())
    }
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(User {
        id,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        is_admin: row.get(4)?,
        is_manager: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_default_admin_created() {
        let (store, _temp) = create_test_store();

        let admin = store.get_user_by_email("admin@bugboard.local").unwrap();
        assert!(admin.is_some());

        let admin = admin.unwrap();
        assert!(admin.is_admin);
        assert!(!admin.is_manager);
    }

    #[test]
    fn test_password_verification() {
        let (store, _temp) = create_test_store();

        assert!(store
            .verify_password("admin@bugboard.local", "admin123")
            .unwrap());
        assert!(!store
            .verify_password("admin@bugboard.local", "wrongpassword")
            .unwrap());
        assert!(!store.verify_password("nobody@example.com", "pass").unwrap());
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let (store, _temp) = create_test_store();

        let user = store
            .create_user("Dev One", "dev1@example.com", "password123", false, true)
            .unwrap();

        let by_email = store.get_user_by_email("dev1@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(by_email.is_manager);

        let by_id = store.get_user_by_id(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "dev1@example.com");
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (store, _temp) = create_test_store();

        store
            .create_user("First", "dup@example.com", "pass", false, false)
            .unwrap();
        let second = store.create_user("Second", "dup@example.com", "pass", false, false);
        assert!(second.is_err());
    }

    #[test]
    fn test_role_change_visible_on_next_lookup() {
        let (store, _temp) = create_test_store();

        let mut user = store
            .create_user("Dev", "dev@example.com", "pass", false, false)
            .unwrap();

        user.is_manager = true;
        store.update_user(&user).unwrap();

        let reloaded = store.get_user_by_id(&user.id).unwrap().unwrap();
        assert!(reloaded.is_manager);
        assert!(!reloaded.is_admin);
    }

    #[test]
    fn test_delete_user() {
        let (store, _temp) = create_test_store();

        let user = store
            .create_user("Temp", "temp@example.com", "pass", false, false)
            .unwrap();

        store.delete_user(&user.id).unwrap();
        assert!(store.get_user_by_id(&user.id).unwrap().is_none());

        // Deleting again reports the miss
        assert!(store.delete_user(&user.id).is_err());
    }

    #[test]
    fn test_list_users() {
        let (store, _temp) = create_test_store();

        store
            .create_user("A", "a@example.com", "pass", false, false)
            .unwrap();
        store
            .create_user("B", "b@example.com", "pass", false, false)
            .unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 3); // default admin + A + B
    }
}
