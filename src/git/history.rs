//! Commit history, optionally restricted to a path.
//!
//! Commits are visited in topological/time order. With a path filter, each
//! commit is compared against its first parent (or the empty tree for a
//! root): it is kept if any changed path is the filter path or lies under
//! it. When the filter path was created by a rename, the filter switches to
//! the old name so the file is followed through the rename.
//!
//! Pages fetch one commit more than requested; that extra commit only
//! signals `has_more` and becomes the `next` cursor.

use git2::{Commit, Delta, DiffFindOptions, Oid, Repository, Sort, Tree};
use std::path::Path;
use std::time::Instant;

use crate::error::Result;
use crate::git::refs::{resolve_cursor, resolve_ref};
use crate::git::repository::{commit_to_detail, GitRepository};
use crate::models::{CommitDetail, LogPage};

enum PathChange {
    Untouched,
    Changed,
    /// Changed, and the filter path was renamed from this path
    RenamedFrom(String),
}

/// `candidate` is `filter` itself or lies beneath it.
fn is_within(candidate: &str, filter: &str) -> bool {
    candidate == filter
        || (candidate.len() > filter.len()
            && candidate.starts_with(filter)
            && candidate.as_bytes()[filter.len()] == b'/')
}

fn entry_id_at(tree: &Tree, path: &str) -> Result<Option<Oid>> {
    match tree.get_path(Path::new(path)) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn path_change(repo: &Repository, commit: &Commit, path: &str) -> Result<PathChange> {
    let tree = commit.tree()?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let here = entry_id_at(&tree, path)?;
    let before = match &parent_tree {
        Some(t) => entry_id_at(t, path)?,
        None => None,
    };
    if here == before {
        return Ok(PathChange::Untouched);
    }

    // No pathspec here: rename detection needs to see the old path too.
    let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    let mut find = DiffFindOptions::new();
    find.renames(true);
    diff.find_similar(Some(&mut find))?;

    let mut changed = false;
    for delta in diff.deltas() {
        let old_path = delta.old_file().path().map(|p| p.to_string_lossy().to_string());
        let new_path = delta.new_file().path().map(|p| p.to_string_lossy().to_string());

        let touches = |p: &Option<String>| p.as_deref().is_some_and(|p| is_within(p, path));
        if !touches(&old_path) && !touches(&new_path) {
            continue;
        }
        changed = true;

        if delta.status() == Delta::Renamed && new_path.as_deref() == Some(path) {
            if let Some(old) = old_path {
                return Ok(PathChange::RenamedFrom(old));
            }
        }
    }

    Ok(if changed {
        PathChange::Changed
    } else {
        PathChange::Untouched
    })
}

/// Walk history from `start`, returning at most `limit` commits.
///
/// `stop` excludes that commit and everything reachable from it.
pub fn walk_history(
    repo: &Repository,
    start: Oid,
    path: Option<&str>,
    limit: usize,
    stop: Option<Oid>,
) -> Result<LogPage> {
    let limit = limit.max(1);
    let started = Instant::now();

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push(start)?;
    if let Some(stop) = stop {
        revwalk.hide(stop)?;
    }

    let mut filter = path
        .map(|p| p.trim_matches('/').to_string())
        .filter(|p| !p.is_empty());
    let mut commits: Vec<CommitDetail> = Vec::new();
    let mut visited = 0usize;

    for oid in revwalk {
        let commit = repo.find_commit(oid?)?;
        visited += 1;

        if let Some(current) = filter.as_deref() {
            match path_change(repo, &commit, current)? {
                PathChange::Untouched => continue,
                PathChange::Changed => {}
                PathChange::RenamedFrom(old) => {
                    tracing::debug!(commit = %commit.id(), from = %old, "Following rename");
                    filter = Some(old);
                }
            }
        }

        commits.push(commit_to_detail(&commit));
        if commits.len() > limit {
            break;
        }
    }

    let has_more = commits.len() > limit;
    let next = if has_more {
        commits.pop().map(|c| c.oid)
    } else {
        None
    };

    if path.is_some() {
        tracing::info!(
            path = path.unwrap_or(""),
            visited,
            returned = commits.len(),
            "Filtered history walk in {:?}",
            started.elapsed()
        );
    }

    Ok(LogPage {
        commits,
        has_more,
        next,
    })
}

impl GitRepository {
    /// One page of history for `(ref, path)`.
    ///
    /// `start` and `stop` are untrusted commit cursors; an unknown cursor is
    /// NotFound.
    pub fn get_log(
        &self,
        ref_name: Option<&str>,
        path: Option<&str>,
        start: Option<&str>,
        stop: Option<&str>,
        limit: usize,
    ) -> Result<LogPage> {
        self.with_repo(|repo| {
            if ref_name.is_none() && repo.is_empty()? {
                return Ok(LogPage {
                    commits: Vec::new(),
                    has_more: false,
                    next: None,
                });
            }

            let resolved = resolve_ref(repo, ref_name, path, self.default_branch_override())?;
            let start_id = match start {
                Some(cursor) => resolve_cursor(repo, cursor)?.id(),
                None => resolved.commit.id(),
            };
            let stop_id = match stop {
                Some(cursor) => Some(resolve_cursor(repo, cursor)?.id()),
                None => None,
            };

            let filter = Some(resolved.path.as_str()).filter(|p| !p.is_empty());
            walk_history(repo, start_id, filter, limit, stop_id)
        })
    }

    pub fn get_commit(&self, id: &str) -> Result<CommitDetail> {
        self.with_repo(|repo| Ok(commit_to_detail(&resolve_cursor(repo, id)?)))
    }
}
