//! Workspace Manager for linkshelf.
//!
//! Implements `WorkspaceManagerTrait`: creation, lookup, renaming, cascade
//! deletion and the idempotent default-tenant provisioning step.

use rusqlite::{params, Connection, OptionalExtension};

use super::user_manager::{UserManager, UserManagerTrait};
use super::{new_id, now_millis, require_name};
use crate::database;
use crate::types::errors::{StoreError, StoreResult};
use crate::types::workspace::{Workspace, WorkspaceSummary};

const MAX_NAME_LENGTH: usize = 100;

const SUMMARY_COLUMNS: &str = "w.id, w.name, w.user_id, w.created_at, w.updated_at, \
     (SELECT COUNT(*) FROM bookmarks b WHERE b.workspace_id = w.id), \
     (SELECT COUNT(*) FROM folders f WHERE f.workspace_id = w.id), \
     (SELECT COUNT(*) FROM tags t WHERE t.workspace_id = w.id)";

/// Trait defining workspace lifecycle operations.
pub trait WorkspaceManagerTrait {
    fn create_workspace(&mut self, name: &str, user_id: &str) -> StoreResult<Workspace>;
    fn get_workspace(&self, id: &str) -> StoreResult<WorkspaceSummary>;
    fn list_workspaces(&self, user_id: &str) -> StoreResult<Vec<WorkspaceSummary>>;
    fn rename_workspace(&mut self, id: &str, name: &str) -> StoreResult<Workspace>;
    /// Deletes the workspace; the schema cascade removes everything it owns.
    fn delete_workspace(&mut self, id: &str) -> StoreResult<()>;
    /// Returns the workspace with this id, creating it (and an owner) if missing.
    fn ensure_workspace(&mut self, id: &str, name: &str) -> StoreResult<Workspace>;
}

/// Workspace manager backed by a SQLite connection.
pub struct WorkspaceManager<'a> {
    conn: &'a Connection,
}

impl<'a> WorkspaceManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_workspace(row: &rusqlite::Row) -> rusqlite::Result<Workspace> {
        Ok(Workspace {
            id: row.get(0)?,
            name: row.get(1)?,
            user_id: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<WorkspaceSummary> {
        Ok(WorkspaceSummary {
            workspace: Self::row_to_workspace(row)?,
            bookmark_count: row.get(5)?,
            folder_count: row.get(6)?,
            tag_count: row.get(7)?,
        })
    }

    fn find(conn: &Connection, id: &str) -> StoreResult<Option<Workspace>> {
        Ok(conn
            .query_row(
                "SELECT id, name, user_id, created_at, updated_at FROM workspaces WHERE id = ?1",
                params![id],
                Self::row_to_workspace,
            )
            .optional()?)
    }

    fn insert(conn: &Connection, id: &str, name: &str, user_id: &str) -> StoreResult<Workspace> {
        let now = now_millis();
        conn.execute(
            "INSERT INTO workspaces (id, name, user_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![id, name, user_id, now],
        )?;
        Ok(Workspace {
            id: id.to_string(),
            name: name.to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl<'a> WorkspaceManagerTrait for WorkspaceManager<'a> {
    fn create_workspace(&mut self, name: &str, user_id: &str) -> StoreResult<Workspace> {
        let name = require_name("name", name, MAX_NAME_LENGTH)?;
        UserManager::new(self.conn).get_user(user_id)?;

        let workspace = Self::insert(self.conn, &new_id(), &name, user_id)?;
        tracing::info!(workspace_id = %workspace.id, user_id, "created workspace");
        Ok(workspace)
    }

    fn get_workspace(&self, id: &str) -> StoreResult<WorkspaceSummary> {
        let sql = format!("SELECT {} FROM workspaces w WHERE w.id = ?1", SUMMARY_COLUMNS);
        self.conn
            .query_row(&sql, params![id], Self::row_to_summary)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("workspace {}", id)))
    }

    fn list_workspaces(&self, user_id: &str) -> StoreResult<Vec<WorkspaceSummary>> {
        let sql = format!(
            "SELECT {} FROM workspaces w WHERE w.user_id = ?1 ORDER BY w.created_at DESC, w.rowid DESC",
            SUMMARY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], Self::row_to_summary)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn rename_workspace(&mut self, id: &str, name: &str) -> StoreResult<Workspace> {
        let name = require_name("name", name, MAX_NAME_LENGTH)?;
        let affected = self.conn.execute(
            "UPDATE workspaces SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![name, now_millis(), id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("workspace {}", id)));
        }
        Self::find(self.conn, id)?.ok_or_else(|| StoreError::NotFound(format!("workspace {}", id)))
    }

    fn delete_workspace(&mut self, id: &str) -> StoreResult<()> {
        let tx = database::begin(self.conn)?;
        let affected = tx.execute("DELETE FROM workspaces WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("workspace {}", id)));
        }
        tx.commit()?;
        tracing::info!(workspace_id = id, "deleted workspace");
        Ok(())
    }

    fn ensure_workspace(&mut self, id: &str, name: &str) -> StoreResult<Workspace> {
        if id.trim().is_empty() {
            return Err(StoreError::ValidationFailed("workspace id is required".to_string()));
        }
        let name = require_name("name", name, MAX_NAME_LENGTH)?;

        let tx = database::begin(self.conn)?;
        if let Some(existing) = Self::find(&tx, id)? {
            return Ok(existing);
        }
        let owner = UserManager::new(&tx).ensure_any_user()?;
        let workspace = Self::insert(&tx, id, &name, &owner.id)?;
        tx.commit()?;

        tracing::info!(workspace_id = id, user_id = %owner.id, "provisioned workspace");
        Ok(workspace)
    }
}
