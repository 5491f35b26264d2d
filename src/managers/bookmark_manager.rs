//! Bookmark Manager for linkshelf.
//!
//! Implements `BookmarkManagerTrait`: bookmark CRUD, archiving, filtered
//! listing and the URL/tag sets attached to each bookmark, backed by SQLite
//! via `rusqlite`.
//!
//! Every write keeps two rules on the URL set: at least one URL, and exactly
//! one of them primary. Multi-step writes run in a single transaction.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::folder_manager::FolderManager;
use super::tag_manager::{resolve_tag_ids, TagManager};
use super::{new_id, now_millis, require_name, require_workspace};
use crate::database;
use crate::services::query_sanitizer::effective_query;
use crate::services::url_rules::{clean_entry, normalize_primary, validate_url};
use crate::types::bookmark::{
    Bookmark, BookmarkDetails, BookmarkFilter, BookmarkUpdate, BookmarkUrl, FolderRef, NewBookmark, UrlInput,
};
use crate::types::errors::{StoreError, StoreResult};
use crate::types::tag::Tag;

const MAX_TITLE_LENGTH: usize = 500;
const MAX_DESCRIPTION_LENGTH: usize = 2000;

const BOOKMARK_COLUMNS: &str =
    "b.id, b.title, b.description, b.workspace_id, b.folder_id, b.archived, b.revision, b.created_at, b.updated_at";

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn create_bookmark(&mut self, input: NewBookmark) -> StoreResult<BookmarkDetails>;
    fn get_bookmark(&self, id: &str) -> StoreResult<BookmarkDetails>;
    fn update_bookmark(&mut self, id: &str, update: BookmarkUpdate) -> StoreResult<BookmarkDetails>;
    fn archive_bookmark(&mut self, id: &str) -> StoreResult<()>;
    fn restore_bookmark(&mut self, id: &str) -> StoreResult<()>;
    /// Adds one URL. A primary URL demotes the current primary first.
    fn add_url(&mut self, bookmark_id: &str, entry: UrlInput) -> StoreResult<BookmarkUrl>;
    /// Removes one URL, refusing to remove the last one.
    fn remove_url(&mut self, bookmark_id: &str, url_id: &str) -> StoreResult<()>;
    /// Lists matching bookmarks, most recently updated first.
    fn list_bookmarks(&self, filter: &BookmarkFilter) -> StoreResult<Vec<BookmarkDetails>>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            workspace_id: row.get(3)?,
            folder_id: row.get(4)?,
            archived: row.get(5)?,
            revision: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn row_to_url(row: &rusqlite::Row) -> rusqlite::Result<BookmarkUrl> {
        Ok(BookmarkUrl {
            id: row.get(0)?,
            bookmark_id: row.get(1)?,
            url: row.get(2)?,
            is_primary: row.get(3)?,
            label: row.get(4)?,
            position: row.get(5)?,
        })
    }

    fn find(conn: &Connection, id: &str) -> StoreResult<Bookmark> {
        let sql = format!("SELECT {} FROM bookmarks b WHERE b.id = ?1", BOOKMARK_COLUMNS);
        conn.query_row(&sql, params![id], Self::row_to_bookmark)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("bookmark {}", id)))
    }

    fn load_urls(conn: &Connection, bookmark_id: &str) -> StoreResult<Vec<BookmarkUrl>> {
        let mut stmt = conn.prepare(
            "SELECT id, bookmark_id, url, is_primary, label, position FROM bookmark_urls \
             WHERE bookmark_id = ?1 ORDER BY position, rowid",
        )?;
        let rows = stmt.query_map(params![bookmark_id], Self::row_to_url)?;

        let mut urls = Vec::new();
        for row in rows {
            urls.push(row?);
        }
        Ok(urls)
    }

    fn load_tags(conn: &Connection, bookmark_id: &str) -> StoreResult<Vec<Tag>> {
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.workspace_id, t.created_at FROM bookmark_tags bt \
             JOIN tags t ON t.id = bt.tag_id WHERE bt.bookmark_id = ?1 ORDER BY t.name",
        )?;
        let rows = stmt.query_map(params![bookmark_id], TagManager::row_to_tag)?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    fn expand(conn: &Connection, bookmark: Bookmark) -> StoreResult<BookmarkDetails> {
        let urls = Self::load_urls(conn, &bookmark.id)?;
        let tags = Self::load_tags(conn, &bookmark.id)?;
        let folder = match &bookmark.folder_id {
            Some(fid) => conn
                .query_row(
                    "SELECT id, name FROM folders WHERE id = ?1",
                    params![fid],
                    |row| {
                        Ok(FolderRef {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    },
                )
                .optional()?,
            None => None,
        };
        Ok(BookmarkDetails {
            bookmark,
            urls,
            tags,
            folder,
        })
    }

    fn clean_description(description: Option<&str>) -> StoreResult<Option<String>> {
        match description.map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => Err(StoreError::ValidationFailed(
                format!("description must be at most {} characters", MAX_DESCRIPTION_LENGTH),
            )),
            Some(text) => Ok(Some(text.to_string())),
        }
    }

    /// Inserts an already normalized URL list with consecutive positions.
    fn insert_urls(conn: &Connection, bookmark_id: &str, urls: &[UrlInput]) -> StoreResult<()> {
        let mut stmt = conn.prepare(
            "INSERT INTO bookmark_urls (id, bookmark_id, url, is_primary, label, position) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (position, entry) in urls.iter().enumerate() {
            stmt.execute(params![
                new_id(),
                bookmark_id,
                entry.url,
                entry.is_primary,
                entry.label,
                position as i32
            ])?;
        }
        Ok(())
    }

    fn insert_tags(conn: &Connection, bookmark_id: &str, tag_ids: &[String]) -> StoreResult<()> {
        let mut stmt = conn.prepare("INSERT INTO bookmark_tags (bookmark_id, tag_id) VALUES (?1, ?2)")?;
        for tag_id in tag_ids {
            stmt.execute(params![bookmark_id, tag_id])?;
        }
        Ok(())
    }

    /// Bumps `updated_at` and `revision` after a change to an owned row.
    fn touch(conn: &Connection, bookmark_id: &str) -> StoreResult<()> {
        conn.execute(
            "UPDATE bookmarks SET updated_at = ?1, revision = revision + 1 WHERE id = ?2",
            params![now_millis(), bookmark_id],
        )?;
        Ok(())
    }

    fn set_archived(&mut self, id: &str, archived: bool) -> StoreResult<()> {
        let affected = self.conn.execute(
            "UPDATE bookmarks SET archived = ?1, updated_at = ?2, revision = revision + 1 WHERE id = ?3",
            params![archived, now_millis(), id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("bookmark {}", id)));
        }
        tracing::debug!(bookmark_id = id, archived, "changed archive state");
        Ok(())
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    fn create_bookmark(&mut self, input: NewBookmark) -> StoreResult<BookmarkDetails> {
        let title = require_name("title", &input.title, MAX_TITLE_LENGTH)?;
        let description = Self::clean_description(input.description.as_deref())?;
        let urls = normalize_primary(&input.urls)?;
        let folder_id = input.folder_id.filter(|f| !f.is_empty());

        let tx = database::begin(self.conn)?;
        require_workspace(&tx, &input.workspace_id)?;
        if let Some(fid) = &folder_id {
            FolderManager::find_in_workspace(&tx, fid, &input.workspace_id)?;
        }
        let tag_ids = resolve_tag_ids(&tx, &input.workspace_id, &input.tag_ids)?;

        let id = new_id();
        let now = now_millis();
        tx.execute(
            "INSERT INTO bookmarks (id, title, description, workspace_id, folder_id, archived, revision, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?6)",
            params![id, title, description, input.workspace_id, folder_id, now],
        )?;
        Self::insert_urls(&tx, &id, &urls)?;
        Self::insert_tags(&tx, &id, &tag_ids)?;

        let details = Self::expand(&tx, Self::find(&tx, &id)?)?;
        tx.commit()?;

        tracing::debug!(bookmark_id = %id, urls = urls.len(), tags = tag_ids.len(), "created bookmark");
        Ok(details)
    }

    fn get_bookmark(&self, id: &str) -> StoreResult<BookmarkDetails> {
        let bookmark = Self::find(self.conn, id)?;
        Self::expand(self.conn, bookmark)
    }

    fn update_bookmark(&mut self, id: &str, update: BookmarkUpdate) -> StoreResult<BookmarkDetails> {
        let tx = database::begin(self.conn)?;
        let mut bookmark = Self::find(&tx, id)?;

        if let Some(expected) = update.expected_revision {
            if expected != bookmark.revision {
                return Err(StoreError::Conflict(format!(
                    "bookmark {} is at revision {}, not {}",
                    id, bookmark.revision, expected
                )));
            }
        }

        if let Some(title) = &update.title {
            bookmark.title = require_name("title", title, MAX_TITLE_LENGTH)?;
        }
        if let Some(description) = &update.description {
            bookmark.description = Self::clean_description(description.as_deref())?;
        }
        if let Some(folder_id) = &update.folder_id {
            let folder_id = folder_id.clone().filter(|f| !f.is_empty());
            if let Some(fid) = &folder_id {
                FolderManager::find_in_workspace(&tx, fid, &bookmark.workspace_id)?;
            }
            bookmark.folder_id = folder_id;
        }
        if let Some(archived) = update.archived {
            bookmark.archived = archived;
        }

        let tag_ids = match &update.tag_ids {
            Some(ids) => Some(resolve_tag_ids(&tx, &bookmark.workspace_id, ids)?),
            None => None,
        };
        let urls = match &update.urls {
            Some(entries) => Some(normalize_primary(entries)?),
            None => None,
        };

        bookmark.revision += 1;
        bookmark.updated_at = now_millis();
        tx.execute(
            "UPDATE bookmarks SET title = ?1, description = ?2, folder_id = ?3, archived = ?4, \
             revision = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                bookmark.title,
                bookmark.description,
                bookmark.folder_id,
                bookmark.archived,
                bookmark.revision,
                bookmark.updated_at,
                id
            ],
        )?;

        // URL and tag sets are replaced wholesale; URL ids are not preserved.
        if let Some(urls) = &urls {
            tx.execute("DELETE FROM bookmark_urls WHERE bookmark_id = ?1", params![id])?;
            Self::insert_urls(&tx, id, urls)?;
        }
        if let Some(tag_ids) = &tag_ids {
            tx.execute("DELETE FROM bookmark_tags WHERE bookmark_id = ?1", params![id])?;
            Self::insert_tags(&tx, id, tag_ids)?;
        }

        let details = Self::expand(&tx, bookmark)?;
        tx.commit()?;

        tracing::debug!(bookmark_id = id, revision = details.bookmark.revision, "updated bookmark");
        Ok(details)
    }

    fn archive_bookmark(&mut self, id: &str) -> StoreResult<()> {
        self.set_archived(id, true)
    }

    fn restore_bookmark(&mut self, id: &str) -> StoreResult<()> {
        self.set_archived(id, false)
    }

    fn add_url(&mut self, bookmark_id: &str, entry: UrlInput) -> StoreResult<BookmarkUrl> {
        validate_url(&entry.url)?;
        let entry = clean_entry(&entry);

        let tx = database::begin(self.conn)?;
        Self::find(&tx, bookmark_id)?;

        let has_primary: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM bookmark_urls WHERE bookmark_id = ?1 AND is_primary = 1)",
            params![bookmark_id],
            |row| row.get(0),
        )?;
        if entry.is_primary {
            tx.execute(
                "UPDATE bookmark_urls SET is_primary = 0 WHERE bookmark_id = ?1 AND is_primary = 1",
                params![bookmark_id],
            )?;
        }
        let is_primary = entry.is_primary || !has_primary;

        let position: i32 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM bookmark_urls WHERE bookmark_id = ?1",
            params![bookmark_id],
            |row| row.get(0),
        )?;
        let url = BookmarkUrl {
            id: new_id(),
            bookmark_id: bookmark_id.to_string(),
            url: entry.url,
            is_primary,
            label: entry.label,
            position,
        };
        tx.execute(
            "INSERT INTO bookmark_urls (id, bookmark_id, url, is_primary, label, position) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![url.id, url.bookmark_id, url.url, url.is_primary, url.label, url.position],
        )?;
        Self::touch(&tx, bookmark_id)?;
        tx.commit()?;

        tracing::debug!(bookmark_id, url_id = %url.id, is_primary, "added bookmark url");
        Ok(url)
    }

    fn remove_url(&mut self, bookmark_id: &str, url_id: &str) -> StoreResult<()> {
        let tx = database::begin(self.conn)?;
        Self::find(&tx, bookmark_id)?;

        let urls = Self::load_urls(&tx, bookmark_id)?;
        let target = urls
            .iter()
            .find(|u| u.id == url_id)
            .ok_or_else(|| StoreError::NotFound(format!("url {} on bookmark {}", url_id, bookmark_id)))?;

        if urls.len() == 1 {
            tracing::warn!(bookmark_id, url_id, "refused to remove the only url");
            return Err(StoreError::InvariantViolation(
                "cannot delete the only URL; a bookmark must have at least one URL".to_string(),
            ));
        }

        // Promote before deleting so no state without a primary is ever written.
        if target.is_primary {
            if let Some(successor) = urls.iter().find(|u| u.id != url_id) {
                tx.execute(
                    "UPDATE bookmark_urls SET is_primary = 1 WHERE id = ?1",
                    params![successor.id],
                )?;
            }
        }

        tx.execute("DELETE FROM bookmark_urls WHERE id = ?1", params![url_id])?;
        Self::touch(&tx, bookmark_id)?;
        tx.commit()?;

        tracing::debug!(bookmark_id, url_id, "removed bookmark url");
        Ok(())
    }

    fn list_bookmarks(&self, filter: &BookmarkFilter) -> StoreResult<Vec<BookmarkDetails>> {
        let mut sql = format!(
            "SELECT {} FROM bookmarks b WHERE b.workspace_id = ? AND b.archived = ?",
            BOOKMARK_COLUMNS
        );
        let mut args: Vec<Value> = vec![
            Value::Text(filter.workspace_id.clone()),
            Value::Integer(filter.archived as i64),
        ];

        if let Some(folder_id) = filter.folder_id.as_deref().filter(|f| !f.is_empty()) {
            sql.push_str(" AND b.folder_id = ?");
            args.push(Value::Text(folder_id.to_string()));
        }
        if let Some(tag_id) = filter.tag_id.as_deref().filter(|t| !t.is_empty()) {
            sql.push_str(" AND EXISTS (SELECT 1 FROM bookmark_tags bt WHERE bt.bookmark_id = b.id AND bt.tag_id = ?)");
            args.push(Value::Text(tag_id.to_string()));
        }
        // instr() is case-sensitive, unlike LIKE.
        if let Some(query) = effective_query(filter.query.as_deref()) {
            sql.push_str(
                " AND (instr(b.title, ?) > 0 \
                 OR instr(COALESCE(b.description, ''), ?) > 0 \
                 OR EXISTS (SELECT 1 FROM bookmark_urls u WHERE u.bookmark_id = b.id AND instr(u.url, ?) > 0))",
            );
            for _ in 0..3 {
                args.push(Value::Text(query.clone()));
            }
        }
        sql.push_str(" ORDER BY b.updated_at DESC, b.rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(Self::expand(self.conn, row?)?);
        }
        Ok(results)
    }
}
