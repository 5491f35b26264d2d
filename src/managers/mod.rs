// linkshelf state managers
// Each manager borrows the SQLite connection and owns the rules for one aggregate:
// bookmarks (with their URL and tag sets), folders, tags, workspaces and users.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::types::errors::{StoreError, StoreResult};

pub mod bookmark_manager;
pub mod folder_manager;
pub mod tag_manager;
pub mod user_manager;
pub mod workspace_manager;

/// Returns the current UNIX timestamp in milliseconds.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Fails with `NotFound` unless the workspace exists.
pub(crate) fn require_workspace(conn: &Connection, workspace_id: &str) -> StoreResult<()> {
    let found: Option<i32> = conn
        .query_row(
            "SELECT 1 FROM workspaces WHERE id = ?1",
            params![workspace_id],
            |row| row.get(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound(format!("workspace {}", workspace_id))),
    }
}

/// Trims `value` and checks its length is within `1..=max` characters.
pub(crate) fn require_name(field: &str, value: &str, max: usize) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::ValidationFailed(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max {
        return Err(StoreError::ValidationFailed(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}
