use serde::{Deserialize, Serialize};

/// Represents a folder for organizing bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    pub parent_id: Option<String>,
    pub order: i32,
    pub revision: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A folder with its children materialized and a bookmark count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    #[serde(flatten)]
    pub folder: Folder,
    pub bookmark_count: i64,
    pub children: Vec<FolderNode>,
}

/// Partial update of a folder. `parent_id: Some(None)` moves it to the root.
#[derive(Debug, Clone, Default)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub parent_id: Option<Option<String>>,
    pub order: Option<i32>,
    pub expected_revision: Option<i64>,
}

/// Which folders a delete takes down with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderDeletePolicy {
    /// The folder and its direct children only.
    #[default]
    Shallow,
    /// The folder and its whole subtree.
    Recursive,
}
