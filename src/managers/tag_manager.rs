//! Tag Manager for linkshelf.
//!
//! Tags are unique by name within a workspace. Deleting a tag removes its
//! links to bookmarks through the schema cascade; the bookmarks stay.

use rusqlite::{params, Connection, OptionalExtension};

use super::{new_id, now_millis, require_name, require_workspace};
use crate::types::errors::{StoreError, StoreResult};
use crate::types::tag::{Tag, TagDetails, TagSummary, TaggedBookmark};

const MAX_NAME_LENGTH: usize = 50;

/// Trait defining tag operations.
pub trait TagManagerTrait {
    fn create_tag(&mut self, workspace_id: &str, name: &str) -> StoreResult<Tag>;
    fn rename_tag(&mut self, id: &str, name: &str) -> StoreResult<Tag>;
    fn delete_tag(&mut self, id: &str) -> StoreResult<()>;
    fn get_tag(&self, id: &str) -> StoreResult<TagDetails>;
    fn list_tags(&self, workspace_id: &str) -> StoreResult<Vec<TagSummary>>;
}

/// Tag manager backed by a SQLite connection.
pub struct TagManager<'a> {
    conn: &'a Connection,
}

impl<'a> TagManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub(crate) fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            workspace_id: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn find(&self, id: &str) -> StoreResult<Tag> {
        self.conn
            .query_row(
                "SELECT id, name, workspace_id, created_at FROM tags WHERE id = ?1",
                params![id],
                Self::row_to_tag,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("tag {}", id)))
    }

    fn name_taken(&self, workspace_id: &str, name: &str, except_id: Option<&str>) -> StoreResult<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM tags WHERE workspace_id = ?1 AND name = ?2",
                params![workspace_id, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(match (found, except_id) {
            (Some(found), Some(except)) => found != except,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }
}

/// Resolves tag ids for assignment to a bookmark of `workspace_id`.
///
/// Duplicates are collapsed, keeping first-seen order. If any id does not
/// name a tag of that workspace the whole set is rejected.
pub fn resolve_tag_ids(conn: &Connection, workspace_id: &str, tag_ids: &[String]) -> StoreResult<Vec<String>> {
    let mut resolved: Vec<String> = Vec::with_capacity(tag_ids.len());
    for id in tag_ids {
        if resolved.contains(id) {
            continue;
        }
        let found: Option<i32> = conn
            .query_row(
                "SELECT 1 FROM tags WHERE id = ?1 AND workspace_id = ?2",
                params![id, workspace_id],
                |row| row.get(0),
            )
            .optional()?;
        if found.is_none() {
            return Err(StoreError::ValidationFailed(format!(
                "tag {} does not exist in workspace {}",
                id, workspace_id
            )));
        }
        resolved.push(id.clone());
    }
    Ok(resolved)
}

impl<'a> TagManagerTrait for TagManager<'a> {
    fn create_tag(&mut self, workspace_id: &str, name: &str) -> StoreResult<Tag> {
        let name = require_name("name", name, MAX_NAME_LENGTH)?;
        require_workspace(self.conn, workspace_id)?;

        if self.name_taken(workspace_id, &name, None)? {
            return Err(StoreError::Conflict(format!("tag already exists: {}", name)));
        }

        let tag = Tag {
            id: new_id(),
            name,
            workspace_id: workspace_id.to_string(),
            created_at: now_millis(),
        };
        self.conn.execute(
            "INSERT INTO tags (id, name, workspace_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![tag.id, tag.name, tag.workspace_id, tag.created_at],
        )?;
        tracing::debug!(tag_id = %tag.id, workspace_id, "created tag");
        Ok(tag)
    }

    fn rename_tag(&mut self, id: &str, name: &str) -> StoreResult<Tag> {
        let name = require_name("name", name, MAX_NAME_LENGTH)?;
        let mut tag = self.find(id)?;

        if self.name_taken(&tag.workspace_id, &name, Some(id))? {
            return Err(StoreError::Conflict(format!("tag already exists: {}", name)));
        }

        self.conn
            .execute("UPDATE tags SET name = ?1 WHERE id = ?2", params![name, id])?;
        tag.name = name;
        Ok(tag)
    }

    fn delete_tag(&mut self, id: &str) -> StoreResult<()> {
        let affected = self.conn.execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("tag {}", id)));
        }
        tracing::debug!(tag_id = id, "deleted tag");
        Ok(())
    }

    fn get_tag(&self, id: &str) -> StoreResult<TagDetails> {
        let tag = self.find(id)?;

        let mut stmt = self.conn.prepare(
            "SELECT b.id, b.title FROM bookmark_tags bt \
             JOIN bookmarks b ON b.id = bt.bookmark_id \
             WHERE bt.tag_id = ?1 ORDER BY b.title",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok(TaggedBookmark {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })?;

        let mut bookmarks = Vec::new();
        for row in rows {
            bookmarks.push(row?);
        }
        Ok(TagDetails { tag, bookmarks })
    }

    fn list_tags(&self, workspace_id: &str) -> StoreResult<Vec<TagSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name, t.workspace_id, t.created_at, \
             (SELECT COUNT(*) FROM bookmark_tags bt WHERE bt.tag_id = t.id) \
             FROM tags t WHERE t.workspace_id = ?1 ORDER BY t.name",
        )?;
        let rows = stmt.query_map(params![workspace_id], |row| {
            Ok(TagSummary {
                tag: Self::row_to_tag(row)?,
                bookmark_count: row.get(4)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}
