//! Line attribution for a file, reduced to display hunks.

use git2::{BlameOptions, Oid, Repository};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::git::object::GitObject;
use crate::git::refs::{lookup_path, resolve_ref};
use crate::git::repository::GitRepository;
use crate::models::{BlameHunk, BlameResponse};

/// A hunk as produced by the object store's blame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHunk {
    pub commit: String,
    pub committer_name: String,
    pub committer_email: String,
    pub start_line: usize,
    pub lines: usize,
}

/// Merge adjacent hunks that share a commit.
///
/// Only neighbours are merged: two runs from the same commit separated by
/// another commit stay apart, since they are distinct edits.
pub fn consolidate<I>(hunks: I) -> Vec<BlameHunk>
where
    I: IntoIterator<Item = RawHunk>,
{
    let mut out = Vec::new();
    let mut acc: Option<BlameHunk> = None;

    for hunk in hunks {
        if let Some(current) = acc.as_mut() {
            if current.commit == hunk.commit {
                current.lines += hunk.lines;
                continue;
            }
        }
        if let Some(done) = acc.take() {
            out.push(done);
        }
        acc = Some(BlameHunk {
            commit: hunk.commit,
            committer_name: hunk.committer_name,
            committer_email: hunk.committer_email,
            start_line: hunk.start_line,
            lines: hunk.lines,
        });
    }

    if let Some(done) = acc {
        out.push(done);
    }
    out
}

/// Run the store's blame for `path` as of `newest` and convert each hunk.
pub fn raw_blame(repo: &Repository, path: &str, newest: Oid) -> Result<Vec<RawHunk>> {
    let mut opts = BlameOptions::new();
    opts.newest_commit(newest);
    let blame = repo.blame_file(Path::new(path), Some(&mut opts))?;

    let mut committers: HashMap<Oid, (String, String)> = HashMap::new();
    let mut hunks = Vec::with_capacity(blame.len());

    for hunk in blame.iter() {
        let id = hunk.final_commit_id();
        let (name, email) = match committers.get(&id) {
            Some(known) => known.clone(),
            None => {
                let commit = repo.find_commit(id)?;
                let committer = commit.committer();
                let known = (
                    committer.name().unwrap_or("Unknown").to_string(),
                    committer.email().unwrap_or("").to_string(),
                );
                committers.insert(id, known.clone());
                known
            }
        };

        hunks.push(RawHunk {
            commit: id.to_string(),
            committer_name: name,
            committer_email: email,
            start_line: hunk.final_start_line(),
            lines: hunk.lines_in_hunk(),
        });
    }

    Ok(hunks)
}

impl GitRepository {
    pub fn get_blame(&self, ref_name: Option<&str>, path: Option<&str>) -> Result<BlameResponse> {
        self.with_repo(|repo| {
            let resolved = resolve_ref(repo, ref_name, path, self.default_branch_override())?;
            let root = resolved.commit.tree()?;

            let blob = match lookup_path(repo, &root, &resolved.path)? {
                GitObject::Blob(blob) => blob,
                GitObject::Tree(_) | GitObject::Commit(_) | GitObject::Tag(_) => {
                    return Err(AppError::InvalidState(format!(
                        "cannot blame {}: not a file",
                        resolved.path
                    )));
                }
            };

            let hunks = consolidate(raw_blame(repo, &resolved.path, resolved.commit.id())?);
            let lines = String::from_utf8_lossy(blob.content())
                .lines()
                .map(|l| l.to_string())
                .collect();

            Ok(BlameResponse {
                ref_name: resolved.ref_name,
                commit: resolved.commit.id().to_string(),
                path: resolved.path,
                hunks,
                lines,
            })
        })
    }
}
