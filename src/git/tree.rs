use git2::{Oid, Repository};
use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::git::annotate::annotate_tree;
use crate::git::object::GitObject;
use crate::git::refs::{lookup_path, resolve_ref};
use crate::git::repository::{commit_to_info, GitRepository};
use crate::models::{BlobResponse, CommitInfo, EntryType, TreeEntry, TreeResponse};

/// Look up commits by id once per request.
struct CommitInfoCache<'a> {
    repo: &'a Repository,
    seen: HashMap<String, Option<CommitInfo>>,
}

impl<'a> CommitInfoCache<'a> {
    fn new(repo: &'a Repository) -> Self {
        Self {
            repo,
            seen: HashMap::new(),
        }
    }

    fn get(&mut self, oid: &str) -> Option<CommitInfo> {
        let repo = self.repo;
        self.seen
            .entry(oid.to_string())
            .or_insert_with(|| {
                Oid::from_str(oid)
                    .and_then(|id| repo.find_commit(id))
                    .ok()
                    .map(|c| commit_to_info(&c))
            })
            .clone()
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

/// Split `a/b/c` into (`a/b`, `c`).
fn split_parent(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", path),
    }
}

impl GitRepository {
    /// List a directory at `(ref, path)` with each entry's last change.
    pub fn get_tree(&self, ref_name: Option<&str>, path: Option<&str>) -> Result<TreeResponse> {
        self.with_repo(|repo| {
            let resolved = resolve_ref(repo, ref_name, path, self.default_branch_override())?;
            let root = resolved.commit.tree()?;

            let dir = match lookup_path(repo, &root, &resolved.path)? {
                GitObject::Tree(tree) => tree,
                GitObject::Blob(_) | GitObject::Commit(_) | GitObject::Tag(_) => {
                    return Err(AppError::InvalidState(format!(
                        "{} is not a directory",
                        resolved.path
                    )));
                }
            };

            let annotations = annotate_tree(repo, self.cache(), &resolved.commit, &resolved.path)?;
            let odb = repo.odb()?;
            let mut commits = CommitInfoCache::new(repo);

            let mut entries: Vec<TreeEntry> = annotations
                .into_values()
                .map(|entry| {
                    let size = if entry.entry_type == EntryType::File {
                        Oid::from_str(&entry.id)
                            .and_then(|id| odb.read_header(id))
                            .ok()
                            .map(|(size, _)| size as u64)
                    } else {
                        None
                    };

                    TreeEntry {
                        path: join_path(&resolved.path, &entry.name),
                        last_commit: entry.commit.as_deref().and_then(|c| commits.get(c)),
                        mode: format!("{:06o}", entry.mode),
                        name: entry.name,
                        id: entry.id,
                        entry_type: entry.entry_type,
                        size,
                    }
                })
                .collect();

            // Sort: directories first, then files, alphabetically
            entries.sort_by(|a, b| match (&a.entry_type, &b.entry_type) {
                (EntryType::Directory, EntryType::Directory) => {
                    a.name.to_lowercase().cmp(&b.name.to_lowercase())
                }
                (EntryType::Directory, _) => std::cmp::Ordering::Less,
                (_, EntryType::Directory) => std::cmp::Ordering::Greater,
                _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            });

            Ok(TreeResponse {
                ref_name: resolved.ref_name,
                commit: resolved.commit.id().to_string(),
                tree_id: dir.id().to_string(),
                path: resolved.path,
                entries,
            })
        })
    }

    /// Fetch a file at `(ref, path)` along with the commit that last
    /// changed it.
    pub fn get_blob(&self, ref_name: Option<&str>, path: Option<&str>) -> Result<BlobResponse> {
        self.with_repo(|repo| {
            let resolved = resolve_ref(repo, ref_name, path, self.default_branch_override())?;
            let root = resolved.commit.tree()?;

            let blob = match lookup_path(repo, &root, &resolved.path)? {
                GitObject::Blob(blob) => blob,
                GitObject::Tree(_) | GitObject::Commit(_) | GitObject::Tag(_) => {
                    return Err(AppError::InvalidState(format!("{} is not a file", resolved.path)));
                }
            };

            let (parent, name) = split_parent(&resolved.path);
            let annotations = annotate_tree(repo, self.cache(), &resolved.commit, parent)?;
            let last_commit = annotations
                .get(name)
                .and_then(|e| e.commit.as_deref())
                .and_then(|c| CommitInfoCache::new(repo).get(c));

            let is_binary = blob.is_binary();
            let content = if is_binary {
                None
            } else {
                String::from_utf8(blob.content().to_vec()).ok()
            };

            Ok(BlobResponse {
                ref_name: resolved.ref_name,
                id: blob.id().to_string(),
                size: blob.size() as u64,
                is_binary,
                content,
                last_commit,
                path: resolved.path,
            })
        })
    }
}
