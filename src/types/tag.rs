use serde::{Deserialize, Serialize};

/// A workspace-scoped label attachable to bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    pub created_at: i64,
}

/// Tag with the number of bookmarks carrying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSummary {
    #[serde(flatten)]
    pub tag: Tag,
    pub bookmark_count: i64,
}

/// Tag with the bookmarks carrying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDetails {
    #[serde(flatten)]
    pub tag: Tag,
    pub bookmarks: Vec<TaggedBookmark>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaggedBookmark {
    pub id: String,
    pub title: String,
}
