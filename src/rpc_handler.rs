//! RPC method handler for the linkshelf JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` decodes params, calls the managers through the `App`, and
//! returns either a JSON result or an [`RpcError`] carrying a machine-readable
//! kind.

use std::sync::Mutex;

use serde::Serialize;
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::managers::folder_manager::FolderManagerTrait;
use crate::managers::tag_manager::TagManagerTrait;
use crate::managers::user_manager::UserManagerTrait;
use crate::managers::workspace_manager::WorkspaceManagerTrait;
use crate::types::bookmark::{BookmarkFilter, BookmarkUpdate, NewBookmark, UrlInput};
use crate::types::errors::{ErrorKind, StoreError};
use crate::types::folder::FolderUpdate;

/// Error returned to RPC callers: `{"kind": "...", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RpcError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationFailed, message)
    }
}

impl From<StoreError> for RpcError {
    fn from(err: StoreError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

type RpcResult = Result<Value, RpcError>;

fn required_str<'p>(params: &'p Value, key: &str) -> Result<&'p str, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid(format!("missing {}", key)))
}

fn optional_str<'p>(params: &'p Value, key: &str) -> Result<Option<&'p str>, RpcError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(RpcError::invalid(format!("{} must be a string", key))),
    }
}

/// Absent → `None` (leave unchanged), `null` → `Some(None)` (clear), string → `Some(Some(_))`.
fn nullable_str(params: &Value, key: &str) -> Result<Option<Option<String>>, RpcError> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(RpcError::invalid(format!("{} must be a string or null", key))),
    }
}

fn optional_bool(params: &Value, key: &str) -> Result<Option<bool>, RpcError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(RpcError::invalid(format!("{} must be a boolean", key))),
    }
}

fn optional_i64(params: &Value, key: &str) -> Result<Option<i64>, RpcError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| RpcError::invalid(format!("{} must be an integer", key))),
    }
}

fn string_list(value: &Value, key: &str) -> Result<Vec<String>, RpcError> {
    let items = value
        .as_array()
        .ok_or_else(|| RpcError::invalid(format!("{} must be an array", key)))?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| RpcError::invalid(format!("{} must contain strings", key)))
        })
        .collect()
}

fn url_list(value: &Value) -> Result<Vec<UrlInput>, RpcError> {
    let items = value
        .as_array()
        .ok_or_else(|| RpcError::invalid("urls must be an array"))?;
    items.iter().map(url_entry).collect()
}

fn url_entry(value: &Value) -> Result<UrlInput, RpcError> {
    Ok(UrlInput {
        url: required_str(value, "url")?.to_string(),
        is_primary: optional_bool(value, "is_primary")?.unwrap_or(false),
        label: optional_str(value, "label")?.map(str::to_string),
    })
}

fn to_json<T: Serialize>(value: &T) -> RpcResult {
    serde_json::to_value(value).map_err(|e| RpcError::new(ErrorKind::Internal, e.to_string()))
}

fn workspace_param<'p>(params: &'p Value, app: &'p App) -> Result<&'p str, RpcError> {
    Ok(optional_str(params, "workspace_id")?.unwrap_or_else(|| app.default_workspace_id()))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> RpcResult {
    let a = app
        .lock()
        .map_err(|e| RpcError::new(ErrorKind::Internal, e.to_string()))?;

    let result = dispatch(&a, method, params);
    if let Err(err) = &result {
        tracing::debug!(method, kind = err.kind.as_str(), message = %err.message, "rpc call failed");
    }
    result
}

fn dispatch(app: &App, method: &str, params: &Value) -> RpcResult {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Bookmarks ───
        "bookmark.create" => {
            let urls = match params.get("urls") {
                Some(v) => url_list(v)?,
                None => return Err(RpcError::invalid("missing urls")),
            };
            let tag_ids = match params.get("tag_ids") {
                Some(Value::Null) | None => Vec::new(),
                Some(v) => string_list(v, "tag_ids")?,
            };
            let input = NewBookmark {
                workspace_id: workspace_param(params, app)?.to_string(),
                title: required_str(params, "title")?.to_string(),
                description: optional_str(params, "description")?.map(str::to_string),
                folder_id: optional_str(params, "folder_id")?.map(str::to_string),
                tag_ids,
                urls,
            };
            let details = app.bookmarks().create_bookmark(input)?;
            to_json(&details)
        }
        "bookmark.get" => {
            let id = required_str(params, "id")?;
            to_json(&app.bookmarks().get_bookmark(id)?)
        }
        "bookmark.update" => {
            let id = required_str(params, "id")?;
            let update = BookmarkUpdate {
                title: optional_str(params, "title")?.map(str::to_string),
                description: nullable_str(params, "description")?,
                folder_id: nullable_str(params, "folder_id")?,
                archived: optional_bool(params, "archived")?,
                urls: match params.get("urls") {
                    Some(Value::Null) | None => None,
                    Some(v) => Some(url_list(v)?),
                },
                tag_ids: match params.get("tag_ids") {
                    Some(Value::Null) | None => None,
                    Some(v) => Some(string_list(v, "tag_ids")?),
                },
                expected_revision: optional_i64(params, "expected_revision")?,
            };
            to_json(&app.bookmarks().update_bookmark(id, update)?)
        }
        "bookmark.archive" => {
            let id = required_str(params, "id")?;
            app.bookmarks().archive_bookmark(id)?;
            Ok(json!({"ok": true}))
        }
        "bookmark.restore" => {
            let id = required_str(params, "id")?;
            app.bookmarks().restore_bookmark(id)?;
            Ok(json!({"ok": true}))
        }
        "bookmark.list" => {
            let filter = BookmarkFilter {
                query: optional_str(params, "q")?.map(str::to_string),
                folder_id: optional_str(params, "folder_id")?.map(str::to_string),
                tag_id: optional_str(params, "tag_id")?.map(str::to_string),
                archived: optional_bool(params, "archived")?.unwrap_or(false),
                ..BookmarkFilter::for_workspace(workspace_param(params, app)?)
            };
            to_json(&app.bookmarks().list_bookmarks(&filter)?)
        }
        "bookmark.url.add" => {
            let bookmark_id = required_str(params, "bookmark_id")?;
            let entry = url_entry(params)?;
            to_json(&app.bookmarks().add_url(bookmark_id, entry)?)
        }
        "bookmark.url.remove" => {
            let bookmark_id = required_str(params, "bookmark_id")?;
            let url_id = required_str(params, "url_id")?;
            app.bookmarks().remove_url(bookmark_id, url_id)?;
            Ok(json!({"ok": true}))
        }

        // ─── Folders ───
        "folder.create" => {
            let workspace_id = workspace_param(params, app)?;
            let name = required_str(params, "name")?;
            let parent_id = optional_str(params, "parent_id")?.filter(|p| !p.is_empty());
            to_json(&app.folders().create_folder(workspace_id, name, parent_id)?)
        }
        "folder.get" => {
            let id = required_str(params, "id")?;
            to_json(&app.folders().get_folder(id)?)
        }
        "folder.list" => {
            let workspace_id = workspace_param(params, app)?;
            to_json(&app.folders().list_tree(workspace_id)?)
        }
        "folder.update" => {
            let id = required_str(params, "id")?;
            let order = match optional_i64(params, "order")? {
                Some(o) => Some(i32::try_from(o).map_err(|_| RpcError::invalid("order out of range"))?),
                None => None,
            };
            let update = FolderUpdate {
                name: optional_str(params, "name")?.map(str::to_string),
                parent_id: nullable_str(params, "parent_id")?.map(|p| p.filter(|s| !s.is_empty())),
                order,
                expected_revision: optional_i64(params, "expected_revision")?,
            };
            to_json(&app.folders().update_folder(id, update)?)
        }
        "folder.delete" => {
            let id = required_str(params, "id")?;
            let removed = app.folders().delete_folder(id)?;
            Ok(json!({"ok": true, "removed": removed}))
        }

        // ─── Tags ───
        "tag.create" => {
            let workspace_id = workspace_param(params, app)?;
            let name = required_str(params, "name")?;
            to_json(&app.tags().create_tag(workspace_id, name)?)
        }
        "tag.get" => {
            let id = required_str(params, "id")?;
            to_json(&app.tags().get_tag(id)?)
        }
        "tag.list" => {
            let workspace_id = workspace_param(params, app)?;
            to_json(&app.tags().list_tags(workspace_id)?)
        }
        "tag.update" => {
            let id = required_str(params, "id")?;
            let name = required_str(params, "name")?;
            to_json(&app.tags().rename_tag(id, name)?)
        }
        "tag.delete" => {
            let id = required_str(params, "id")?;
            app.tags().delete_tag(id)?;
            Ok(json!({"ok": true}))
        }

        // ─── Workspaces ───
        "workspace.create" => {
            let name = required_str(params, "name")?;
            let user_id = required_str(params, "user_id")?;
            to_json(&app.workspaces().create_workspace(name, user_id)?)
        }
        "workspace.get" => {
            let id = required_str(params, "id")?;
            to_json(&app.workspaces().get_workspace(id)?)
        }
        "workspace.list" => {
            let user_id = required_str(params, "user_id")?;
            to_json(&app.workspaces().list_workspaces(user_id)?)
        }
        "workspace.update" => {
            let id = required_str(params, "id")?;
            let name = required_str(params, "name")?;
            to_json(&app.workspaces().rename_workspace(id, name)?)
        }
        "workspace.delete" => {
            let id = required_str(params, "id")?;
            app.workspaces().delete_workspace(id)?;
            Ok(json!({"ok": true}))
        }
        "workspace.ensure" => {
            let workspace = match optional_str(params, "id")? {
                Some(id) => {
                    let name = optional_str(params, "name")?.unwrap_or(app.settings.default_workspace_name.as_str());
                    app.workspaces().ensure_workspace(id, name)?
                }
                None => app.ensure_default_workspace()?,
            };
            to_json(&workspace)
        }

        // ─── Users ───
        "user.create" => {
            let email = required_str(params, "email")?;
            let password = required_str(params, "password")?;
            to_json(&app.users().create_user(email, password)?)
        }

        _ => Err(RpcError::invalid(format!("unknown method: {}", method))),
    }
}
