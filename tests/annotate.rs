//! Last-change annotation of tree listings and blobs.

mod common;

use std::sync::Arc;

use common::{Change, TestRepo};
use git_browse::cache::MemoryCache;
use git_browse::error::AppError;
use git_browse::models::{EntryType, TreeResponse};

/// C1 adds a.txt and lib/{x,y}.rs, C2 edits lib/y.rs, C3 adds b.txt,
/// C4 edits a.txt.
fn layered_history() -> (TestRepo, [git2::Oid; 4]) {
    let mut t = TestRepo::new();
    let c1 = t.commit(
        "master",
        "initial",
        &[
            Change::Write("a.txt", "alpha\n"),
            Change::Write("lib/x.rs", "// x\n"),
            Change::Write("lib/y.rs", "// y\n"),
        ],
    );
    let c2 = t.commit("master", "edit y", &[Change::Write("lib/y.rs", "// y, edited\n")]);
    let c3 = t.commit("master", "add b", &[Change::Write("b.txt", "beta\n")]);
    let c4 = t.commit("master", "edit a", &[Change::Write("a.txt", "alpha, edited\n")]);
    (t, [c1, c2, c3, c4])
}

fn attribution(tree: &TreeResponse) -> Vec<(String, String)> {
    tree.entries
        .iter()
        .map(|e| {
            let commit = e.last_commit.as_ref().map(|c| c.oid.clone()).unwrap_or_default();
            (e.name.clone(), commit)
        })
        .collect()
}

#[test]
fn test_root_listing_attribution_and_order() {
    let (t, [_, c2, c3, c4]) = layered_history();
    let tree = t.open().get_tree(None, None).unwrap();

    assert_eq!(
        attribution(&tree),
        vec![
            ("lib".to_string(), c2.to_string()),
            ("a.txt".to_string(), c4.to_string()),
            ("b.txt".to_string(), c3.to_string()),
        ]
    );
    assert_eq!(tree.entries[0].entry_type, EntryType::Directory);
    assert_eq!(tree.entries[0].size, None);
    assert_eq!(tree.entries[1].size, Some("alpha, edited\n".len() as u64));
    assert_eq!(tree.entries[1].mode, "100644");
    assert_eq!(tree.entries[1].path, "a.txt");
}

#[test]
fn test_subdirectory_attribution() {
    let (t, [c1, c2, _, _]) = layered_history();
    let tree = t.open().get_tree(None, Some("lib")).unwrap();

    assert_eq!(tree.path, "lib");
    assert_eq!(
        attribution(&tree),
        vec![
            ("x.rs".to_string(), c1.to_string()),
            ("y.rs".to_string(), c2.to_string()),
        ]
    );
    assert_eq!(tree.entries[0].path, "lib/x.rs");
}

#[test]
fn test_attributed_commits_are_ancestors() {
    let (t, [_, _, c3, _]) = layered_history();
    let repo = t.open();

    // Annotate as of an older commit: nothing newer may be attributed.
    let tree = repo.get_tree(Some(&c3.to_string()), None).unwrap();
    for entry in &tree.entries {
        let commit = entry.last_commit.as_ref().expect("every entry is attributed");
        assert!(t.is_ancestor(&commit.oid, c3), "{} is not an ancestor", commit.oid);
    }

    let tip = repo.get_tree(None, None).unwrap();
    let head = t.tip("master").unwrap();
    for entry in &tip.entries {
        let commit = entry.last_commit.as_ref().expect("every entry is attributed");
        assert!(t.is_ancestor(&commit.oid, head));
    }
}

#[test]
fn test_identical_content_under_different_names() {
    let mut t = TestRepo::new();
    let c1 = t.commit(
        "master",
        "two copies",
        &[Change::Write("one", "same\n"), Change::Write("two", "same\n")],
    );
    let c2 = t.commit("master", "third copy", &[Change::Write("three", "same\n")]);

    let tree = t.open().get_tree(None, None).unwrap();
    assert_eq!(
        attribution(&tree),
        vec![
            ("one".to_string(), c1.to_string()),
            ("three".to_string(), c2.to_string()),
            ("two".to_string(), c1.to_string()),
        ]
    );
}

#[test]
fn test_annotation_independent_of_cache_state() {
    let (t, _) = layered_history();
    let cache = Arc::new(MemoryCache::new(100));
    let cached = t.open_with(cache.clone());
    let uncached = t.open();

    let cold = cached.get_tree(None, Some("lib")).unwrap();
    assert!(cache.entry_count() >= 1);
    let warm = cached.get_tree(None, Some("lib")).unwrap();
    let fresh = uncached.get_tree(None, Some("lib")).unwrap();

    assert_eq!(attribution(&cold), attribution(&warm));
    assert_eq!(attribution(&cold), attribution(&fresh));
    assert_eq!(cold.tree_id, warm.tree_id);
}

#[test]
fn test_blob_carries_last_change() {
    let (t, [_, c2, _, _]) = layered_history();
    let blob = t.open().get_blob(None, Some("lib/y.rs")).unwrap();

    assert_eq!(blob.path, "lib/y.rs");
    assert_eq!(blob.content.as_deref(), Some("// y, edited\n"));
    assert!(!blob.is_binary);
    assert_eq!(blob.last_commit.map(|c| c.oid), Some(c2.to_string()));
}

#[test]
fn test_binary_blob_has_no_text() {
    let mut t = TestRepo::new();
    t.commit("master", "binary", &[Change::Write("data.bin", "\u{0}\u{1}\u{2}binary")]);

    let blob = t.open().get_blob(None, Some("data.bin")).unwrap();
    assert!(blob.is_binary);
    assert!(blob.content.is_none());
    assert_eq!(blob.size, 9);
}

#[test]
fn test_wrong_kind_and_missing_paths() {
    let (t, _) = layered_history();
    let repo = t.open();

    let err = repo.get_tree(None, Some("a.txt")).unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "got {:?}", err);

    let err = repo.get_blob(None, Some("lib")).unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "got {:?}", err);

    let err = repo.get_tree(Some("master"), Some("nowhere")).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);

    let err = repo.get_blob(Some("master"), Some("a.txt/inner")).unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "got {:?}", err);
}

#[test]
fn test_shared_tree_on_diverging_branches() {
    let mut t = TestRepo::new();
    let root = t.commit("master", "root", &[Change::Write("README", "hello\n")]);
    let m1 = t.commit("master", "add f", &[Change::Write("f", "same\n")]);
    let s1 = t.commit_onto("side", Some(root), "add f too", &[Change::Write("f", "same\n")]);

    let cache = Arc::new(MemoryCache::new(100));
    let repo = t.open_with(cache.clone());

    let master = repo.get_tree(Some("master"), None).unwrap();
    let side = repo.get_tree(Some("side"), None).unwrap();
    assert_eq!(master.tree_id, side.tree_id);

    for entry in &side.entries {
        let commit = entry.last_commit.as_ref().expect("every entry is attributed");
        assert!(t.is_ancestor(&commit.oid, s1), "{} attributed to {}", entry.name, commit.oid);
    }
    assert_eq!(attribution(&side), attribution(&t.open().get_tree(Some("side"), None).unwrap()));
    assert_eq!(
        attribution(&master),
        vec![
            ("f".to_string(), m1.to_string()),
            ("README".to_string(), root.to_string()),
        ]
    );
}

#[test]
fn test_reverted_tree_is_attributed_to_the_revert() {
    let mut t = TestRepo::new();
    let c1 = t.commit("master", "one", &[Change::Write("f", "1\n")]);
    t.commit("master", "two", &[Change::Write("f", "2\n")]);
    let c3 = t.commit("master", "back to one", &[Change::Write("f", "1\n")]);

    let repo = t.open_cached();
    let old = repo.get_tree(Some(&c1.to_string()), None).unwrap();
    let tip = repo.get_tree(Some("master"), None).unwrap();

    assert_eq!(old.tree_id, tip.tree_id);
    assert_eq!(attribution(&old), vec![("f".to_string(), c1.to_string())]);
    assert_eq!(attribution(&tip), vec![("f".to_string(), c3.to_string())]);
}

#[test]
fn test_cache_hit_along_unchanged_history() {
    let mut t = TestRepo::new();
    let c1 = t.commit("master", "add lib", &[Change::Write("lib/a", "a\n")]);
    t.commit("master", "outside lib", &[Change::Write("README", "r\n")]);

    let cache = Arc::new(MemoryCache::new(100));
    let repo = t.open_with(cache.clone());
    let first = repo.get_tree(Some(&c1.to_string()), Some("lib")).unwrap();
    let later = repo.get_tree(Some("master"), Some("lib")).unwrap();

    assert_eq!(attribution(&first), attribution(&later));
    assert_eq!(attribution(&later), vec![("a".to_string(), c1.to_string())]);
}
