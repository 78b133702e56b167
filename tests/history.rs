//! Path-filtered history walks and pagination.

mod common;

use common::{Change, TestRepo};
use git_browse::models::LogPage;

fn ids(page: &LogPage) -> Vec<String> {
    page.commits.iter().map(|c| c.oid.clone()).collect()
}

const POEM: &str = "line one\nline two\nline three\nline four\nline five\nline six\n";

#[test]
fn test_path_filter_keeps_only_touching_commits() {
    let mut t = TestRepo::new();
    let c1 = t.commit("master", "add x", &[Change::Write("lib/x", "1\n")]);
    t.commit("master", "unrelated", &[Change::Write("README", "docs\n")]);
    let c3 = t.commit("master", "edit x", &[Change::Write("lib/x", "2\n")]);

    let page = t.open().get_log(None, Some("lib/x"), None, None, 50).unwrap();
    assert_eq!(ids(&page), vec![c3.to_string(), c1.to_string()]);
    assert!(!page.has_more);
    assert!(page.next.is_none());
}

#[test]
fn test_directory_filter_matches_children() {
    let mut t = TestRepo::new();
    let c1 = t.commit("master", "add lib", &[Change::Write("lib/a.rs", "a\n")]);
    t.commit("master", "docs", &[Change::Write("docs/guide.md", "guide\n")]);
    t.commit("master", "sibling prefix", &[Change::Write("library.txt", "not lib\n")]);
    let c4 = t.commit("master", "add b", &[Change::Write("lib/b.rs", "b\n")]);

    let page = t.open().get_log(Some("master"), Some("lib"), None, None, 50).unwrap();
    assert_eq!(ids(&page), vec![c4.to_string(), c1.to_string()]);
}

#[test]
fn test_follows_rename() {
    let mut t = TestRepo::new();
    let c1 = t.commit("master", "add old", &[Change::Write("old.txt", POEM)]);
    t.commit("master", "unrelated", &[Change::Write("other.txt", "x\n")]);
    let c3 = t.commit(
        "master",
        "rename",
        &[Change::Delete("old.txt"), Change::Write("new.txt", POEM)],
    );
    let c4 = t.commit(
        "master",
        "edit new",
        &[Change::Write("new.txt", &format!("{}line seven\n", POEM))],
    );

    let page = t.open().get_log(None, Some("new.txt"), None, None, 50).unwrap();
    assert_eq!(
        ids(&page),
        vec![c4.to_string(), c3.to_string(), c1.to_string()]
    );
}

#[test]
fn test_pagination_cursor() {
    let mut t = TestRepo::new();
    let mut commits = Vec::new();
    for i in 0..5 {
        let content = format!("revision {}\n", i);
        commits.push(t.commit("master", &format!("rev {}", i), &[Change::Write("f", &content)]));
    }
    commits.reverse();
    let repo = t.open();

    let first = repo.get_log(None, None, None, None, 2).unwrap();
    assert_eq!(ids(&first), vec![commits[0].to_string(), commits[1].to_string()]);
    assert!(first.has_more);
    assert_eq!(first.next.as_deref(), Some(commits[2].to_string().as_str()));

    let second = repo
        .get_log(None, None, first.next.as_deref(), None, 2)
        .unwrap();
    assert_eq!(ids(&second), vec![commits[2].to_string(), commits[3].to_string()]);
    assert!(second.has_more);

    let last = repo
        .get_log(None, None, second.next.as_deref(), None, 2)
        .unwrap();
    assert_eq!(ids(&last), vec![commits[4].to_string()]);
    assert!(!last.has_more);
    assert!(last.next.is_none());
}

#[test]
fn test_stop_commit_excludes_its_ancestry() {
    let mut t = TestRepo::new();
    t.commit("master", "one", &[Change::Write("f", "1\n")]);
    let c2 = t.commit("master", "two", &[Change::Write("f", "2\n")]);
    let c3 = t.commit("master", "three", &[Change::Write("f", "3\n")]);
    let c4 = t.commit("master", "four", &[Change::Write("f", "4\n")]);

    let page = t
        .open()
        .get_log(None, None, None, Some(&c2.to_string()), 50)
        .unwrap();
    assert_eq!(ids(&page), vec![c4.to_string(), c3.to_string()]);
}

#[test]
fn test_zero_limit_still_returns_one() {
    let mut t = TestRepo::new();
    t.commit("master", "one", &[Change::Write("f", "1\n")]);
    let c2 = t.commit("master", "two", &[Change::Write("f", "2\n")]);

    let page = t.open().get_log(None, None, None, None, 0).unwrap();
    assert_eq!(ids(&page), vec![c2.to_string()]);
    assert!(page.has_more);
}

#[test]
fn test_commit_detail_by_short_id() {
    let mut t = TestRepo::new();
    t.set_author("Ada", "ada@example.com");
    let root = t.commit("master", "first", &[Change::Write("f", "1\n")]);
    let tip = t.commit("master", "Second change\n\nWith a body.\n", &[Change::Write("f", "2\n")]);

    let tip_id = tip.to_string();
    let short = &tip_id[..7];
    let detail = t.open().get_commit(short).unwrap();
    assert_eq!(detail.oid, tip.to_string());
    assert_eq!(detail.short_id, short);
    assert_eq!(detail.subject, "Second change");
    assert_eq!(detail.message, "Second change\n\nWith a body.\n");
    assert_eq!(detail.author.name, "Ada");
    assert_eq!(detail.parents, vec![root.to_string()]);
}
