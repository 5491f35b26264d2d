//! Unit tests for the TagManager public API: per-workspace name uniqueness,
//! renaming, deletion and bookmark counts.

use linkshelf::database::Database;
use linkshelf::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use linkshelf::managers::tag_manager::{TagManager, TagManagerTrait};
use linkshelf::managers::workspace_manager::{WorkspaceManager, WorkspaceManagerTrait};
use linkshelf::types::bookmark::{NewBookmark, UrlInput};
use linkshelf::types::errors::ErrorKind;

const WS_A: &str = "ws-a";
const WS_B: &str = "ws-b";

fn setup() -> Database {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let mut workspaces = WorkspaceManager::new(db.connection());
    workspaces.ensure_workspace(WS_A, "A").unwrap();
    workspaces.ensure_workspace(WS_B, "B").unwrap();
    db
}

fn tagged_bookmark(db: &Database, title: &str, tag_id: &str) -> String {
    BookmarkManager::new(db.connection())
        .create_bookmark(NewBookmark {
            workspace_id: WS_A.to_string(),
            title: title.to_string(),
            tag_ids: vec![tag_id.to_string()],
            urls: vec![UrlInput::new("https://a.com", true)],
            ..Default::default()
        })
        .unwrap()
        .bookmark
        .id
}

#[test]
fn test_duplicate_name_in_same_workspace_conflicts() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());

    mgr.create_tag(WS_A, "reading").unwrap();
    let err = mgr.create_tag(WS_A, "reading").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_same_name_in_different_workspaces_allowed() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());

    let a = mgr.create_tag(WS_A, "reading").unwrap();
    let b = mgr.create_tag(WS_B, "reading").unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_name_is_trimmed_before_uniqueness_check() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());

    let tag = mgr.create_tag(WS_A, "  news ").unwrap();
    assert_eq!(tag.name, "news");
    assert_eq!(mgr.create_tag(WS_A, "news").unwrap_err().kind(), ErrorKind::Conflict);
}

#[test]
fn test_names_are_case_sensitive() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());

    mgr.create_tag(WS_A, "Rust").unwrap();
    assert!(mgr.create_tag(WS_A, "rust").is_ok());
}

#[test]
fn test_blank_and_long_names_rejected() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());

    assert_eq!(mgr.create_tag(WS_A, " ").unwrap_err().kind(), ErrorKind::ValidationFailed);
    let long = "x".repeat(51);
    assert_eq!(mgr.create_tag(WS_A, &long).unwrap_err().kind(), ErrorKind::ValidationFailed);
}

#[test]
fn test_create_in_missing_workspace_not_found() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());
    assert_eq!(mgr.create_tag("ghost", "x").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_rename_to_taken_name_conflicts() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());
    mgr.create_tag(WS_A, "one").unwrap();
    let two = mgr.create_tag(WS_A, "two").unwrap();

    assert_eq!(mgr.rename_tag(&two.id, "one").unwrap_err().kind(), ErrorKind::Conflict);
    // renaming to its own name is a no-op, not a conflict
    assert_eq!(mgr.rename_tag(&two.id, "two").unwrap().name, "two");
    assert_eq!(mgr.rename_tag(&two.id, "three").unwrap().name, "three");
}

#[test]
fn test_rename_missing_tag_not_found() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());
    assert_eq!(mgr.rename_tag("missing", "x").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_delete_tag_keeps_bookmarks() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());
    let tag = mgr.create_tag(WS_A, "temp").unwrap();
    let bookmark_id = tagged_bookmark(&db, "Keeper", &tag.id);

    mgr.delete_tag(&tag.id).unwrap();

    assert_eq!(mgr.get_tag(&tag.id).unwrap_err().kind(), ErrorKind::NotFound);
    let bookmark = BookmarkManager::new(db.connection()).get_bookmark(&bookmark_id).unwrap();
    assert!(bookmark.tags.is_empty());
}

#[test]
fn test_delete_missing_tag_not_found() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());
    assert_eq!(mgr.delete_tag("missing").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_get_tag_lists_bookmarks_by_title() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());
    let tag = mgr.create_tag(WS_A, "shared").unwrap();
    tagged_bookmark(&db, "Zebra", &tag.id);
    tagged_bookmark(&db, "Apple", &tag.id);

    let details = mgr.get_tag(&tag.id).unwrap();
    let titles: Vec<&str> = details.bookmarks.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Apple", "Zebra"]);
}

#[test]
fn test_list_tags_sorted_with_counts() {
    let db = setup();
    let mut mgr = TagManager::new(db.connection());
    let beta = mgr.create_tag(WS_A, "beta").unwrap();
    mgr.create_tag(WS_A, "alpha").unwrap();
    mgr.create_tag(WS_B, "other").unwrap();
    tagged_bookmark(&db, "One", &beta.id);

    let tags = mgr.list_tags(WS_A).unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.tag.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert_eq!(tags[0].bookmark_count, 0);
    assert_eq!(tags[1].bookmark_count, 1);
}

#[test]
fn test_tag_from_other_workspace_cannot_be_assigned() {
    let db = setup();
    let foreign = TagManager::new(db.connection()).create_tag(WS_B, "foreign").unwrap();

    let err = BookmarkManager::new(db.connection())
        .create_bookmark(NewBookmark {
            workspace_id: WS_A.to_string(),
            title: "Mine".to_string(),
            tag_ids: vec![foreign.id],
            urls: vec![UrlInput::new("https://a.com", true)],
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
}
