//! Folder Manager for linkshelf.
//!
//! Implements `FolderManagerTrait`: a per-workspace folder forest with
//! sibling ordering, reparenting and cascading delete.
//!
//! Which folders a delete removes is decided in one place,
//! [`FolderManager::cascade_targets`], according to the manager's
//! [`FolderDeletePolicy`].

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

use super::{new_id, now_millis, require_name, require_workspace};
use crate::database;
use crate::types::errors::{StoreError, StoreResult};
use crate::types::folder::{Folder, FolderDeletePolicy, FolderNode, FolderUpdate};

const MAX_NAME_LENGTH: usize = 100;

const FOLDER_COLUMNS: &str =
    "id, name, workspace_id, parent_id, sort_order, revision, created_at, updated_at";

/// Trait defining folder tree operations.
pub trait FolderManagerTrait {
    fn create_folder(&mut self, workspace_id: &str, name: &str, parent_id: Option<&str>) -> StoreResult<Folder>;
    /// Returns the folder with its full subtree. Every node carries its own
    /// bookmark count.
    fn get_folder(&self, id: &str) -> StoreResult<FolderNode>;
    /// Returns the workspace's forest, siblings ordered by `order` then `name`.
    fn list_tree(&self, workspace_id: &str) -> StoreResult<Vec<FolderNode>>;
    fn update_folder(&mut self, id: &str, update: FolderUpdate) -> StoreResult<Folder>;
    /// Deletes the folder and its cascade targets. Returns the removed ids,
    /// the folder itself last.
    fn delete_folder(&mut self, id: &str) -> StoreResult<Vec<String>>;
}

/// Folder manager backed by a SQLite connection.
pub struct FolderManager<'a> {
    conn: &'a Connection,
    delete_policy: FolderDeletePolicy,
}

impl<'a> FolderManager<'a> {
    /// Creates a `FolderManager` using the default shallow delete policy.
    pub fn new(conn: &'a Connection) -> Self {
        Self::with_policy(conn, FolderDeletePolicy::default())
    }

    pub fn with_policy(conn: &'a Connection, delete_policy: FolderDeletePolicy) -> Self {
        Self { conn, delete_policy }
    }

    pub(crate) fn row_to_folder(row: &rusqlite::Row) -> rusqlite::Result<Folder> {
        Ok(Folder {
            id: row.get(0)?,
            name: row.get(1)?,
            workspace_id: row.get(2)?,
            parent_id: row.get(3)?,
            order: row.get(4)?,
            revision: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn find(conn: &Connection, id: &str) -> StoreResult<Folder> {
        let sql = format!("SELECT {} FROM folders WHERE id = ?1", FOLDER_COLUMNS);
        conn.query_row(&sql, params![id], Self::row_to_folder)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("folder {}", id)))
    }

    /// Looks up a folder that must belong to `workspace_id`.
    pub(crate) fn find_in_workspace(conn: &Connection, id: &str, workspace_id: &str) -> StoreResult<Folder> {
        let folder = Self::find(conn, id)?;
        if folder.workspace_id != workspace_id {
            return Err(StoreError::NotFound(format!(
                "folder {} in workspace {}",
                id, workspace_id
            )));
        }
        Ok(folder)
    }

    /// Computes the next `order` value under `parent_id`.
    fn next_order(conn: &Connection, workspace_id: &str, parent_id: Option<&str>) -> StoreResult<i32> {
        let order: i32 = conn.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM folders WHERE workspace_id = ?1 AND parent_id IS ?2",
            params![workspace_id, parent_id],
            |row| row.get(0),
        )?;
        Ok(order)
    }

    /// Ids of every folder below `id`, at any depth.
    fn descendants(conn: &Connection, id: &str) -> StoreResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "WITH RECURSIVE subtree(id) AS ( \
                 SELECT id FROM folders WHERE parent_id = ?1 \
                 UNION \
                 SELECT f.id FROM folders f JOIN subtree s ON f.parent_id = s.id \
             ) SELECT id FROM subtree",
        )?;
        let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// The folders removed together with `id` under the current policy.
    ///
    /// `Shallow` returns direct children only; their own children survive and
    /// are detached to the root by `ON DELETE SET NULL`. `Recursive` returns
    /// the whole subtree.
    pub fn cascade_targets(&self, conn: &Connection, id: &str) -> StoreResult<Vec<String>> {
        match self.delete_policy {
            FolderDeletePolicy::Shallow => {
                let mut stmt = conn.prepare("SELECT id FROM folders WHERE parent_id = ?1")?;
                let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
                let mut ids = Vec::new();
                for row in rows {
                    ids.push(row?);
                }
                Ok(ids)
            }
            FolderDeletePolicy::Recursive => Self::descendants(conn, id),
        }
    }

    fn load_workspace_folders(&self, workspace_id: &str) -> StoreResult<Vec<(Folder, i64)>> {
        let sql = format!(
            "SELECT {}, (SELECT COUNT(*) FROM bookmarks b WHERE b.folder_id = folders.id) \
             FROM folders WHERE workspace_id = ?1 ORDER BY sort_order, name",
            FOLDER_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![workspace_id], |row| {
            Ok((Self::row_to_folder(row)?, row.get::<_, i64>(8)?))
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Builds nested nodes from a flat, already sorted folder list.
    fn build_forest(folders: Vec<(Folder, i64)>, root: Option<&str>) -> Vec<FolderNode> {
        let mut by_parent: HashMap<Option<String>, Vec<(Folder, i64)>> = HashMap::new();
        for entry in folders {
            by_parent.entry(entry.0.parent_id.clone()).or_default().push(entry);
        }
        Self::attach_children(&mut by_parent, root.map(str::to_string))
    }

    fn attach_children(
        by_parent: &mut HashMap<Option<String>, Vec<(Folder, i64)>>,
        parent: Option<String>,
    ) -> Vec<FolderNode> {
        let siblings = by_parent.remove(&parent).unwrap_or_default();
        siblings
            .into_iter()
            .map(|(folder, bookmark_count)| {
                let children = Self::attach_children(by_parent, Some(folder.id.clone()));
                FolderNode {
                    folder,
                    bookmark_count,
                    children,
                }
            })
            .collect()
    }
}

impl<'a> FolderManagerTrait for FolderManager<'a> {
    fn create_folder(&mut self, workspace_id: &str, name: &str, parent_id: Option<&str>) -> StoreResult<Folder> {
        let name = require_name("name", name, MAX_NAME_LENGTH)?;

        let tx = database::begin(self.conn)?;
        require_workspace(&tx, workspace_id)?;
        if let Some(pid) = parent_id {
            Self::find_in_workspace(&tx, pid, workspace_id)?;
        }

        let now = now_millis();
        let folder = Folder {
            id: new_id(),
            name,
            workspace_id: workspace_id.to_string(),
            parent_id: parent_id.map(str::to_string),
            order: Self::next_order(&tx, workspace_id, parent_id)?,
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            "INSERT INTO folders (id, name, workspace_id, parent_id, sort_order, revision, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
            params![folder.id, folder.name, folder.workspace_id, folder.parent_id, folder.order, now],
        )?;
        tx.commit()?;

        tracing::debug!(folder_id = %folder.id, workspace_id, "created folder");
        Ok(folder)
    }

    fn get_folder(&self, id: &str) -> StoreResult<FolderNode> {
        let folder = Self::find(self.conn, id)?;
        let bookmark_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM bookmarks WHERE folder_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        let all = self.load_workspace_folders(&folder.workspace_id)?;
        let children = Self::build_forest(all, Some(id));
        Ok(FolderNode {
            folder,
            bookmark_count,
            children,
        })
    }

    fn list_tree(&self, workspace_id: &str) -> StoreResult<Vec<FolderNode>> {
        let all = self.load_workspace_folders(workspace_id)?;
        Ok(Self::build_forest(all, None))
    }

    fn update_folder(&mut self, id: &str, update: FolderUpdate) -> StoreResult<Folder> {
        let tx = database::begin(self.conn)?;
        let mut folder = Self::find(&tx, id)?;

        if let Some(expected) = update.expected_revision {
            if expected != folder.revision {
                return Err(StoreError::Conflict(format!(
                    "folder {} is at revision {}, not {}",
                    id, folder.revision, expected
                )));
            }
        }

        if let Some(name) = &update.name {
            folder.name = require_name("name", name, MAX_NAME_LENGTH)?;
        }

        if let Some(parent) = &update.parent_id {
            if let Some(pid) = parent {
                if pid == id {
                    tracing::warn!(folder_id = id, "rejected self-parenting");
                    return Err(StoreError::ValidationFailed(
                        "a folder cannot be its own parent".to_string(),
                    ));
                }
                Self::find_in_workspace(&tx, pid, &folder.workspace_id)?;
                if Self::descendants(&tx, id)?.iter().any(|d| d == pid) {
                    tracing::warn!(folder_id = id, parent_id = %pid, "rejected reparent under descendant");
                    return Err(StoreError::ValidationFailed(
                        "a folder cannot be moved under its own descendant".to_string(),
                    ));
                }
            }
            folder.parent_id = parent.clone();
        }

        if let Some(order) = update.order {
            folder.order = order;
        }

        folder.revision += 1;
        folder.updated_at = now_millis();
        tx.execute(
            "UPDATE folders SET name = ?1, parent_id = ?2, sort_order = ?3, revision = ?4, updated_at = ?5 WHERE id = ?6",
            params![folder.name, folder.parent_id, folder.order, folder.revision, folder.updated_at, id],
        )?;
        tx.commit()?;

        tracing::debug!(folder_id = id, revision = folder.revision, "updated folder");
        Ok(folder)
    }

    fn delete_folder(&mut self, id: &str) -> StoreResult<Vec<String>> {
        let tx = database::begin(self.conn)?;
        Self::find(&tx, id)?;

        let targets = self.cascade_targets(&tx, id)?;

        // 1. bookmarks of the folder (and of every cascade target) go to the root
        tx.execute("UPDATE bookmarks SET folder_id = NULL WHERE folder_id = ?1", params![id])?;
        for target in &targets {
            tx.execute(
                "UPDATE bookmarks SET folder_id = NULL WHERE folder_id = ?1",
                params![target],
            )?;
        }

        // 2. cascade targets
        for target in &targets {
            tx.execute("DELETE FROM folders WHERE id = ?1", params![target])?;
        }

        // 3. the folder itself
        tx.execute("DELETE FROM folders WHERE id = ?1", params![id])?;
        tx.commit()?;

        tracing::debug!(folder_id = id, removed = targets.len() + 1, policy = ?self.delete_policy, "deleted folder");

        let mut removed = targets;
        removed.push(id.to_string());
        Ok(removed)
    }
}
