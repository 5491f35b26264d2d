use serde::{Deserialize, Serialize};

use super::tag::Tag;

/// Represents a saved bookmark row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub workspace_id: String,
    pub folder_id: Option<String>,
    pub archived: bool,
    pub revision: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One of the URLs attached to a bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarkUrl {
    pub id: String,
    pub bookmark_id: String,
    pub url: String,
    pub is_primary: bool,
    pub label: Option<String>,
    pub position: i32,
}

/// Minimal folder reference embedded in bookmark details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FolderRef {
    pub id: String,
    pub name: String,
}

/// A bookmark with its URLs, tags and folder expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkDetails {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    pub urls: Vec<BookmarkUrl>,
    pub tags: Vec<Tag>,
    pub folder: Option<FolderRef>,
}

impl BookmarkDetails {
    /// Returns the URL currently marked primary, if any.
    pub fn primary_url(&self) -> Option<&BookmarkUrl> {
        self.urls.iter().find(|u| u.is_primary)
    }
}

/// A URL entry as submitted by a caller, before primary normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UrlInput {
    pub url: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub label: Option<String>,
}

impl UrlInput {
    pub fn new(url: &str, is_primary: bool) -> Self {
        Self {
            url: url.to_string(),
            is_primary,
            label: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// Input for creating a bookmark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBookmark {
    pub workspace_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub urls: Vec<UrlInput>,
}

/// Partial update of a bookmark.
///
/// `None` leaves a field untouched. For nullable columns the inner `Option`
/// distinguishes "set to NULL" from "set to a value".
#[derive(Debug, Clone, Default)]
pub struct BookmarkUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub folder_id: Option<Option<String>>,
    pub archived: Option<bool>,
    pub urls: Option<Vec<UrlInput>>,
    pub tag_ids: Option<Vec<String>>,
    pub expected_revision: Option<i64>,
}

/// Filters accepted by bookmark listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkFilter {
    pub workspace_id: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub tag_id: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl BookmarkFilter {
    pub fn for_workspace(workspace_id: &str) -> Self {
        Self {
            workspace_id: workspace_id.to_string(),
            ..Default::default()
        }
    }
}
