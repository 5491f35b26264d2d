//! User Manager for linkshelf.
//!
//! Users only exist to own workspaces. There is no login; the stored hash is
//! kept so the data model matches a real account table.

use rusqlite::{params, Connection, OptionalExtension};

use super::{new_id, now_millis};
use crate::services::password_hasher;
use crate::types::errors::{StoreError, StoreResult};
use crate::types::workspace::User;

/// Email of the user created when a default workspace needs an owner.
pub const PLACEHOLDER_EMAIL: &str = "default@bookmark-manager.local";

const PLACEHOLDER_HASH: &str = "placeholder";

/// Trait defining user operations.
pub trait UserManagerTrait {
    fn create_user(&mut self, email: &str, password: &str) -> StoreResult<User>;
    fn get_user(&self, id: &str) -> StoreResult<User>;
    fn first_user(&self) -> StoreResult<Option<User>>;
    /// Returns the oldest user, creating the placeholder user if there is none.
    fn ensure_any_user(&mut self) -> StoreResult<User>;
}

/// User manager backed by a SQLite connection.
pub struct UserManager<'a> {
    conn: &'a Connection,
}

impl<'a> UserManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn insert(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let user = User {
            id: new_id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now_millis(),
        };
        self.conn.execute(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.email, user.password_hash, user.created_at],
        )?;
        Ok(user)
    }
}

impl<'a> UserManagerTrait for UserManager<'a> {
    fn create_user(&mut self, email: &str, password: &str) -> StoreResult<User> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(StoreError::ValidationFailed(format!("invalid email: {}", email)));
        }
        if password.is_empty() {
            return Err(StoreError::ValidationFailed("password is required".to_string()));
        }

        let taken: Option<i32> = self
            .conn
            .query_row("SELECT 1 FROM users WHERE email = ?1", params![email], |row| row.get(0))
            .optional()?;
        if taken.is_some() {
            return Err(StoreError::Conflict(format!("email already registered: {}", email)));
        }

        let hash = password_hasher::hash_password(password)?;
        let user = self.insert(email, &hash)?;
        tracing::info!(user_id = %user.id, "created user");
        Ok(user)
    }

    fn get_user(&self, id: &str) -> StoreResult<User> {
        self.conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE id = ?1",
                params![id],
                Self::row_to_user,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))
    }

    fn first_user(&self) -> StoreResult<Option<User>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users ORDER BY created_at, rowid LIMIT 1",
                [],
                Self::row_to_user,
            )
            .optional()?)
    }

    fn ensure_any_user(&mut self) -> StoreResult<User> {
        if let Some(user) = self.first_user()? {
            return Ok(user);
        }
        let user = self.insert(PLACEHOLDER_EMAIL, PLACEHOLDER_HASH)?;
        tracing::info!(user_id = %user.id, "created placeholder user");
        Ok(user)
    }
}
