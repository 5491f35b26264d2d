//! Unit tests for the FolderManager public API.
//!
//! Exercises folder creation with sibling ordering, tree listing, partial
//! updates with parent checks, and both delete policies.

use linkshelf::database::Database;
use linkshelf::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use linkshelf::managers::folder_manager::{FolderManager, FolderManagerTrait};
use linkshelf::managers::workspace_manager::{WorkspaceManager, WorkspaceManagerTrait};
use linkshelf::types::bookmark::{NewBookmark, UrlInput};
use linkshelf::types::errors::ErrorKind;
use linkshelf::types::folder::{FolderDeletePolicy, FolderUpdate};

const WS: &str = "ws-folders";

fn setup() -> Database {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    WorkspaceManager::new(db.connection())
        .ensure_workspace(WS, "Folders")
        .expect("Failed to provision workspace");
    db
}

fn bookmark_in(db: &Database, folder_id: &str) -> String {
    BookmarkManager::new(db.connection())
        .create_bookmark(NewBookmark {
            workspace_id: WS.to_string(),
            title: "Filed".to_string(),
            folder_id: Some(folder_id.to_string()),
            urls: vec![UrlInput::new("https://a.com", true)],
            ..Default::default()
        })
        .unwrap()
        .bookmark
        .id
}

fn folder_exists(db: &Database, id: &str) -> bool {
    FolderManager::new(db.connection()).get_folder(id).is_ok()
}

// ─── Create ───

#[test]
fn test_create_assigns_sequential_sibling_order() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());

    let a = mgr.create_folder(WS, "A", None).unwrap();
    let b = mgr.create_folder(WS, "B", None).unwrap();
    let child = mgr.create_folder(WS, "Child", Some(&a.id)).unwrap();

    assert_eq!(a.order, 0);
    assert_eq!(b.order, 1);
    // ordering is per parent
    assert_eq!(child.order, 0);
    assert_eq!(child.parent_id.as_deref(), Some(a.id.as_str()));
}

#[test]
fn test_create_with_missing_parent_not_found() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let err = mgr.create_folder(WS, "Orphan", Some("nope")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_create_with_blank_name_rejected() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let err = mgr.create_folder(WS, "  ", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
}

#[test]
fn test_create_in_missing_workspace_not_found() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let err = mgr.create_folder("ghost", "X", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Listing ───

#[test]
fn test_list_tree_nests_children_and_orders_siblings() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let root = mgr.create_folder(WS, "Root", None).unwrap();
    let zeta = mgr.create_folder(WS, "Zeta", Some(&root.id)).unwrap();
    let alpha = mgr.create_folder(WS, "Alpha", Some(&root.id)).unwrap();
    // same order value: name breaks the tie
    mgr.update_folder(&alpha.id, FolderUpdate { order: Some(zeta.order), ..Default::default() })
        .unwrap();
    bookmark_in(&db, &zeta.id);

    let tree = mgr.list_tree(WS).unwrap();
    assert_eq!(tree.len(), 1);
    let children: Vec<&str> = tree[0].children.iter().map(|n| n.folder.name.as_str()).collect();
    assert_eq!(children, vec!["Alpha", "Zeta"]);
    assert_eq!(tree[0].children[1].bookmark_count, 1);
}

#[test]
fn test_get_folder_returns_subtree() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let a = mgr.create_folder(WS, "A", None).unwrap();
    let b = mgr.create_folder(WS, "B", Some(&a.id)).unwrap();
    let c = mgr.create_folder(WS, "C", Some(&b.id)).unwrap();
    bookmark_in(&db, &a.id);
    bookmark_in(&db, &c.id);
    bookmark_in(&db, &c.id);

    let node = mgr.get_folder(&a.id).unwrap();
    assert_eq!(node.bookmark_count, 1);
    assert_eq!(node.children.len(), 1);
    assert_eq!(node.children[0].bookmark_count, 0);
    let grandchild = &node.children[0].children[0];
    assert_eq!(grandchild.folder.name, "C");
    assert_eq!(grandchild.bookmark_count, 2);
}

// ─── Update ───

#[test]
fn test_partial_update_changes_only_given_fields() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let parent = mgr.create_folder(WS, "Parent", None).unwrap();
    let folder = mgr.create_folder(WS, "Old", Some(&parent.id)).unwrap();

    let renamed = mgr
        .update_folder(&folder.id, FolderUpdate { name: Some("New".to_string()), ..Default::default() })
        .unwrap();

    assert_eq!(renamed.name, "New");
    assert_eq!(renamed.parent_id, folder.parent_id);
    assert_eq!(renamed.order, folder.order);
    assert_eq!(renamed.revision, folder.revision + 1);
}

#[test]
fn test_reparent_to_root_and_back() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let a = mgr.create_folder(WS, "A", None).unwrap();
    let b = mgr.create_folder(WS, "B", Some(&a.id)).unwrap();

    let moved = mgr
        .update_folder(&b.id, FolderUpdate { parent_id: Some(None), ..Default::default() })
        .unwrap();
    assert_eq!(moved.parent_id, None);

    let back = mgr
        .update_folder(&b.id, FolderUpdate { parent_id: Some(Some(a.id.clone())), ..Default::default() })
        .unwrap();
    assert_eq!(back.parent_id.as_deref(), Some(a.id.as_str()));
}

#[test]
fn test_self_parenting_rejected_and_parent_unchanged() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let parent = mgr.create_folder(WS, "Parent", None).unwrap();
    let folder = mgr.create_folder(WS, "Folder", Some(&parent.id)).unwrap();

    let err = mgr
        .update_folder(
            &folder.id,
            FolderUpdate { parent_id: Some(Some(folder.id.clone())), ..Default::default() },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    let after = mgr.get_folder(&folder.id).unwrap();
    assert_eq!(after.folder.parent_id.as_deref(), Some(parent.id.as_str()));
    assert_eq!(after.folder.revision, folder.revision);
}

#[test]
fn test_reparent_under_descendant_rejected() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let a = mgr.create_folder(WS, "A", None).unwrap();
    let b = mgr.create_folder(WS, "B", Some(&a.id)).unwrap();
    let c = mgr.create_folder(WS, "C", Some(&b.id)).unwrap();

    let err = mgr
        .update_folder(&a.id, FolderUpdate { parent_id: Some(Some(c.id.clone())), ..Default::default() })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(mgr.get_folder(&a.id).unwrap().folder.parent_id, None);
}

#[test]
fn test_reparent_to_missing_folder_not_found() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let a = mgr.create_folder(WS, "A", None).unwrap();

    let err = mgr
        .update_folder(&a.id, FolderUpdate { parent_id: Some(Some("gone".to_string())), ..Default::default() })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_update_with_stale_revision_conflicts() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let a = mgr.create_folder(WS, "A", None).unwrap();
    mgr.update_folder(&a.id, FolderUpdate { name: Some("A1".to_string()), ..Default::default() })
        .unwrap();

    let err = mgr
        .update_folder(
            &a.id,
            FolderUpdate { name: Some("A2".to_string()), expected_revision: Some(0), ..Default::default() },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_update_missing_folder_not_found() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let err = mgr.update_folder("missing", FolderUpdate::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Delete ───

/// Folder F holds bookmark B and child folder C; deleting F moves B to the
/// root and removes C.
#[test]
fn test_delete_moves_bookmarks_to_root_and_removes_children() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let f = mgr.create_folder(WS, "F", None).unwrap();
    let b = bookmark_in(&db, &f.id);
    let c = mgr.create_folder(WS, "C", Some(&f.id)).unwrap();

    let removed = mgr.delete_folder(&f.id).unwrap();

    assert_eq!(removed, vec![c.id.clone(), f.id.clone()]);
    let bookmark = BookmarkManager::new(db.connection()).get_bookmark(&b).unwrap();
    assert_eq!(bookmark.bookmark.folder_id, None);
    assert!(!folder_exists(&db, &c.id));
    assert!(!folder_exists(&db, &f.id));
}

#[test]
fn test_shallow_delete_detaches_grandchildren_to_root() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let f = mgr.create_folder(WS, "F", None).unwrap();
    let c = mgr.create_folder(WS, "C", Some(&f.id)).unwrap();
    let g = mgr.create_folder(WS, "G", Some(&c.id)).unwrap();
    let in_g = bookmark_in(&db, &g.id);

    mgr.delete_folder(&f.id).unwrap();

    let survivor = mgr.get_folder(&g.id).unwrap();
    assert_eq!(survivor.folder.parent_id, None);
    let bookmark = BookmarkManager::new(db.connection()).get_bookmark(&in_g).unwrap();
    assert_eq!(bookmark.bookmark.folder_id.as_deref(), Some(g.id.as_str()));
}

#[test]
fn test_recursive_delete_removes_whole_subtree() {
    let db = setup();
    let mut mgr = FolderManager::with_policy(db.connection(), FolderDeletePolicy::Recursive);
    let f = mgr.create_folder(WS, "F", None).unwrap();
    let c = mgr.create_folder(WS, "C", Some(&f.id)).unwrap();
    let g = mgr.create_folder(WS, "G", Some(&c.id)).unwrap();
    let in_g = bookmark_in(&db, &g.id);

    let removed = mgr.delete_folder(&f.id).unwrap();

    assert_eq!(removed.len(), 3);
    assert_eq!(removed.last(), Some(&f.id));
    assert!(!folder_exists(&db, &c.id));
    assert!(!folder_exists(&db, &g.id));
    let bookmark = BookmarkManager::new(db.connection()).get_bookmark(&in_g).unwrap();
    assert_eq!(bookmark.bookmark.folder_id, None);
}

#[test]
fn test_cascade_targets_follow_policy() {
    let db = setup();
    let mut shallow = FolderManager::new(db.connection());
    let f = shallow.create_folder(WS, "F", None).unwrap();
    let c = shallow.create_folder(WS, "C", Some(&f.id)).unwrap();
    shallow.create_folder(WS, "G", Some(&c.id)).unwrap();

    let recursive = FolderManager::with_policy(db.connection(), FolderDeletePolicy::Recursive);
    assert_eq!(shallow.cascade_targets(db.connection(), &f.id).unwrap(), vec![c.id.clone()]);
    assert_eq!(recursive.cascade_targets(db.connection(), &f.id).unwrap().len(), 2);
}

#[test]
fn test_delete_missing_folder_not_found() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    assert_eq!(mgr.delete_folder("missing").unwrap_err().kind(), ErrorKind::NotFound);
}

/// A failure on the final folder row leaves the earlier steps unapplied.
#[test]
fn test_failed_delete_leaves_folder_bookmarks_and_children_intact() {
    let db = setup();
    let mut mgr = FolderManager::new(db.connection());
    let f = mgr.create_folder(WS, "F", None).unwrap();
    let b = bookmark_in(&db, &f.id);
    let c = mgr.create_folder(WS, "C", Some(&f.id)).unwrap();
    db.connection()
        .execute_batch(&format!(
            "CREATE TRIGGER fail_folder_delete BEFORE DELETE ON folders WHEN old.id = '{}' \
             BEGIN SELECT RAISE(ABORT, 'boom'); END;",
            f.id
        ))
        .unwrap();

    let err = mgr.delete_folder(&f.id).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    let bookmark = BookmarkManager::new(db.connection()).get_bookmark(&b).unwrap();
    assert_eq!(bookmark.bookmark.folder_id.as_deref(), Some(f.id.as_str()));
    assert!(folder_exists(&db, &c.id));
    assert!(folder_exists(&db, &f.id));
}
