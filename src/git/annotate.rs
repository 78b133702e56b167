//! Last-change attribution for the entries of a directory.
//!
//! Walks the first-parent chain from the requested commit. At each step the
//! directory (the subtree at the same path) is compared with the parent's by
//! `(name, id)` set difference: entries present here but missing from the
//! parent were introduced by this commit. The walk ends once every entry is
//! attributed, or at a root commit, which takes whatever is left.
//!
//! Results are memoized under the subtree's id together with the commit
//! they were computed for. A hit is reused only when that commit sits on
//! the requested commit's first-parent chain with the directory unchanged
//! in between; otherwise the walk runs again and replaces the entry.

use git2::{Commit, ObjectType, Oid, Repository, Tree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::cache::{cache_key, get_or_miss, set_or_warn, Cache};
use crate::error::{AppError, Result};
use crate::models::EntryType;

const ANNOTATION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// A tree entry plus the commit that last changed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotatedEntry {
    pub name: String,
    pub id: String,
    pub entry_type: EntryType,
    pub mode: i32,
    /// Attributed commit id; `None` only if attribution was impossible
    pub commit: Option<String>,
}

pub type Annotations = BTreeMap<String, AnnotatedEntry>;

/// Cached form: the attribution plus the commit the walk started from.
#[derive(Debug, Serialize, Deserialize)]
struct CachedAnnotations {
    origin: String,
    entries: Annotations,
}

pub fn entry_type(kind: Option<ObjectType>, mode: i32) -> Option<EntryType> {
    match kind {
        Some(ObjectType::Blob) if mode == 0o120000 => Some(EntryType::Symlink),
        Some(ObjectType::Blob) => Some(EntryType::File),
        Some(ObjectType::Tree) => Some(EntryType::Directory),
        Some(ObjectType::Commit) => Some(EntryType::Submodule),
        _ => None,
    }
}

/// The directory at `path` inside `root`, if there is one.
pub fn subtree_at<'r>(repo: &'r Repository, root: &Tree<'r>, path: &str) -> Result<Option<Tree<'r>>> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return Ok(Some(root.clone()));
    }
    let entry = match root.get_path(Path::new(path)) {
        Ok(entry) => entry,
        Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if entry.kind() != Some(ObjectType::Tree) {
        return Ok(None);
    }
    Ok(Some(repo.find_tree(entry.id())?))
}

fn entry_name(entry: &git2::TreeEntry) -> String {
    String::from_utf8_lossy(entry.name_bytes()).to_string()
}

fn entry_set(tree: Option<&Tree>) -> HashSet<(String, Oid)> {
    tree.map(|t| t.iter().map(|e| (entry_name(&e), e.id())).collect())
        .unwrap_or_default()
}

/// Attribute every entry of the directory at `path` in `commit`.
///
/// `path` must name a directory; a file is InvalidState and a missing path
/// NotFound.
pub fn annotate_tree(
    repo: &Repository,
    cache: &dyn Cache,
    commit: &Commit,
    path: &str,
) -> Result<Annotations> {
    let root = commit.tree()?;
    let target = match subtree_at(repo, &root, path)? {
        Some(tree) => tree,
        None if root.get_path(Path::new(path.trim_matches('/'))).is_ok() => {
            return Err(AppError::InvalidState(format!("{} is not a directory", path)));
        }
        None => return Err(AppError::NotFound(format!("path {}", path))),
    };

    let key = cache_key("tree", &[&target.id().to_string(), path.trim_matches('/')]);
    if let Some(bytes) = get_or_miss(cache, &key) {
        match serde_json::from_slice::<CachedAnnotations>(&bytes) {
            Ok(cached) => {
                if reusable_from(repo, commit, &cached.origin, target.id(), path)? {
                    return Ok(cached.entries);
                }
                tracing::debug!(key = %key, origin = %cached.origin, "Cached annotations not on this history");
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry"),
        }
    }

    let annotations = walk_first_parents(repo, commit, &target, path)?;

    let cached = CachedAnnotations {
        origin: commit.id().to_string(),
        entries: annotations,
    };
    match serde_json::to_vec(&cached) {
        Ok(bytes) => set_or_warn(cache, &key, ANNOTATION_TTL, bytes),
        Err(e) => tracing::warn!(key = %key, error = %e, "Could not encode annotations"),
    }

    Ok(cached.entries)
}

/// Whether a walk from `commit` would reach `origin` before the directory
/// at `path` changes. Only then does it produce the same attribution.
fn reusable_from(
    repo: &Repository,
    commit: &Commit,
    origin: &str,
    dir: Oid,
    path: &str,
) -> Result<bool> {
    let Ok(origin) = Oid::from_str(origin) else {
        return Ok(false);
    };

    let mut current = commit.clone();
    loop {
        if current.id() == origin {
            return Ok(true);
        }
        if current.parent_count() == 0 {
            return Ok(false);
        }
        let parent = current.parent(0)?;
        let parent_dir = subtree_at(repo, &parent.tree()?, path)?;
        if parent_dir.map(|t| t.id()) != Some(dir) {
            return Ok(false);
        }
        current = parent;
    }
}

fn walk_first_parents(
    repo: &Repository,
    commit: &Commit,
    target: &Tree,
    path: &str,
) -> Result<Annotations> {
    let start = Instant::now();

    let mut annotations: Annotations = target
        .iter()
        .filter_map(|entry| {
            let name = entry_name(&entry);
            let entry_type = entry_type(entry.kind(), entry.filemode())?;
            Some((
                name.clone(),
                AnnotatedEntry {
                    name,
                    id: entry.id().to_string(),
                    entry_type,
                    mode: entry.filemode(),
                    commit: None,
                },
            ))
        })
        .collect();

    let mut unresolved: HashSet<(String, Oid)> = entry_set(Some(target))
        .into_iter()
        .filter(|(name, _)| annotations.contains_key(name))
        .collect();

    let mut current = commit.clone();
    let mut current_dir = Some(target.id());
    let mut steps = 0usize;

    while !unresolved.is_empty() {
        if current.parent_count() == 0 {
            let id = current.id().to_string();
            for (name, _) in unresolved.drain() {
                if let Some(entry) = annotations.get_mut(&name) {
                    entry.commit = Some(id.clone());
                }
            }
            break;
        }

        let parent = current.parent(0)?;
        let parent_dir = subtree_at(repo, &parent.tree()?, path)?;
        let parent_dir_id = parent_dir.as_ref().map(|t| t.id());

        // Identical subtree ids mean nothing under this directory changed.
        if parent_dir_id != current_dir {
            let parent_entries = entry_set(parent_dir.as_ref());
            let introduced: Vec<(String, Oid)> = unresolved
                .iter()
                .filter(|e| !parent_entries.contains(*e))
                .cloned()
                .collect();

            let id = current.id().to_string();
            for key in introduced {
                unresolved.remove(&key);
                if let Some(entry) = annotations.get_mut(&key.0) {
                    entry.commit = Some(id.clone());
                }
            }
        }

        current_dir = parent_dir_id;
        current = parent;
        steps += 1;
    }

    tracing::info!(
        tree = %target.id(),
        entries = annotations.len(),
        steps,
        "Annotated tree in {:?}",
        start.elapsed()
    );

    Ok(annotations)
}
