use serde::{Deserialize, Serialize};

/// Account that owns workspaces.
///
/// The password hash is never serialized back to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: i64,
}

/// Tenant-like grouping of folders, tags and bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Workspace with counts of what it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub bookmark_count: i64,
    pub folder_count: i64,
    pub tag_count: i64,
}
