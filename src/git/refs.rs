//! Ref and path resolution.
//!
//! Request URLs carry a ref and a path glued together (`tree/<ref>/<path>`),
//! and ref names may themselves contain slashes. Resolution is
//! shortest-ref-first: the bare ref is tried, then path segments are moved
//! onto the ref one at a time until something resolves.

use git2::{BranchType, Commit, ErrorClass, ErrorCode, Object, Repository, Tree};

use crate::error::{AppError, Result};
use crate::git::object::GitObject;
use crate::git::repository::GitRepository;
use crate::models::{RefKind, ReferenceInfo};

/// Outcome of resolving a `(ref, path)` pair.
pub struct ResolvedRef<'r> {
    pub commit: Commit<'r>,
    /// The ref string that resolved, including any path segments consumed
    pub ref_name: String,
    /// What is left of the path after the ref was split off
    pub path: String,
}

/// Errors that mean "this string does not name a revision".
///
/// Ambiguous short ids land here too, so an ambiguous ref silently falls
/// through to path-segment consumption.
fn is_unresolved(e: &git2::Error) -> bool {
    matches!(
        e.code(),
        ErrorCode::NotFound | ErrorCode::Ambiguous | ErrorCode::InvalidSpec | ErrorCode::Invalid
    ) || (e.code() == ErrorCode::GenericError && e.class() == ErrorClass::Reference)
}

fn try_revparse<'r>(repo: &'r Repository, spec: &str) -> Result<Option<Object<'r>>> {
    match repo.revparse_single(spec) {
        Ok(obj) => Ok(Some(obj)),
        Err(e) if is_unresolved(&e) => {
            tracing::debug!(spec, error = %e, "Revision did not resolve");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Try `start`, then `start/seg0`, `start/seg0/seg1`, ...
///
/// Returns the object, the ref string that matched and the number of
/// segments consumed.
fn resolve_greedy<'r>(
    repo: &'r Repository,
    start: &str,
    segments: &[&str],
) -> Result<Option<(Object<'r>, String, usize)>> {
    let mut ref_name = start.to_string();
    let mut consumed = 0;
    loop {
        if let Some(obj) = try_revparse(repo, &ref_name)? {
            return Ok(Some((obj, ref_name, consumed)));
        }
        let Some(next) = segments.get(consumed) else {
            return Ok(None);
        };
        ref_name.push('/');
        ref_name.push_str(next);
        consumed += 1;
    }
}

/// Name of the branch served when a request names no ref.
///
/// Order: configured override, the branch HEAD points at, `master`, then
/// the first local branch. A repository without branches has no default.
pub fn default_branch(repo: &Repository, preferred: Option<&str>) -> Result<String> {
    let exists = |name: &str| repo.find_branch(name, BranchType::Local).is_ok();

    if let Some(name) = preferred {
        if exists(name) {
            return Ok(name.to_string());
        }
        tracing::warn!(branch = name, "Configured default branch does not exist");
    }

    let head_target = repo
        .find_reference("HEAD")
        .ok()
        .and_then(|h| h.symbolic_target().map(|t| t.to_string()));
    if let Some(name) = head_target.as_deref().and_then(|t| t.strip_prefix("refs/heads/")) {
        if exists(name) {
            return Ok(name.to_string());
        }
    }

    if exists("master") {
        return Ok("master".to_string());
    }

    for branch in repo.branches(Some(BranchType::Local))? {
        let (branch, _) = branch?;
        if let Some(name) = branch.name()? {
            return Ok(name.to_string());
        }
    }

    Err(AppError::NotFound("repository has no branches".to_string()))
}

/// Resolve a caller-supplied ref and path to a commit.
///
/// - `ref_name = Some(r)`: shortest-ref-first from `r`; an exhausted path
///   is NotFound.
/// - `ref_name = None`, empty path: the default branch.
/// - `ref_name = None`, non-empty path: the first path segment is tried as
///   a ref the same way; if nothing resolves, the default branch is used
///   with the whole path.
///
/// Annotated tags are peeled; anything that is not a commit afterwards is
/// InvalidState.
pub fn resolve_ref<'r>(
    repo: &'r Repository,
    ref_name: Option<&str>,
    path: Option<&str>,
    default_override: Option<&str>,
) -> Result<ResolvedRef<'r>> {
    let segments: Vec<&str> = path
        .unwrap_or("")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let found = match ref_name.filter(|r| !r.is_empty()) {
        Some(r) => resolve_greedy(repo, r, &segments)?,
        None => {
            let from_path = match segments.split_first() {
                Some((first, rest)) => resolve_greedy(repo, first, rest)?
                    .map(|(obj, name, consumed)| (obj, name, consumed + 1)),
                None => None,
            };
            match from_path {
                Some(hit) => Some(hit),
                None => {
                    let branch = default_branch(repo, default_override)?;
                    try_revparse(repo, &branch)?.map(|obj| (obj, branch, 0))
                }
            }
        }
    };

    let (obj, resolved_name, consumed) = found.ok_or_else(|| {
        AppError::NotFound(format!(
            "no revision matches {}",
            [ref_name.unwrap_or(""), path.unwrap_or("")]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("/")
        ))
    })?;

    let commit = GitObject::classify(obj)?.peel_tags()?.into_commit()?;
    tracing::debug!(ref_name = %resolved_name, commit = %commit.id(), "Resolved ref");

    Ok(ResolvedRef {
        commit,
        ref_name: resolved_name,
        path: segments[consumed..].join("/"),
    })
}

/// Validate an untrusted pagination cursor. Anything that does not
/// resolve to a commit is NotFound.
pub fn resolve_cursor<'r>(repo: &'r Repository, cursor: &str) -> Result<Commit<'r>> {
    let not_found = || AppError::NotFound(format!("commit {}", cursor));
    let obj = try_revparse(repo, cursor)?.ok_or_else(not_found)?;
    match GitObject::classify(obj).and_then(GitObject::peel_tags).and_then(GitObject::into_commit) {
        Ok(commit) => Ok(commit),
        Err(AppError::InvalidState(_)) => Err(not_found()),
        Err(e) => Err(e),
    }
}

/// Walk a slash-separated path inside `root`.
///
/// A missing component is NotFound; descending through a file is
/// InvalidState. The empty path is the root itself.
pub fn lookup_path<'r>(repo: &'r Repository, root: &Tree<'r>, path: &str) -> Result<GitObject<'r>> {
    let mut current = GitObject::Tree(root.clone());
    let mut walked = String::new();

    for part in path.split('/').filter(|p| !p.is_empty()) {
        let tree = match current {
            GitObject::Tree(tree) => tree,
            GitObject::Blob(_) | GitObject::Commit(_) | GitObject::Tag(_) => {
                return Err(AppError::InvalidState(format!("{} is not a directory", walked)));
            }
        };
        if !walked.is_empty() {
            walked.push('/');
        }
        walked.push_str(part);

        let entry = tree
            .get_name(part)
            .ok_or_else(|| AppError::NotFound(format!("path {}", walked)))?;
        if entry.kind() == Some(git2::ObjectType::Commit) {
            return Err(AppError::InvalidState(format!("{} is a submodule", walked)));
        }
        current = GitObject::classify(entry.to_object(repo)?)?;
    }

    Ok(current)
}

pub fn list_references(repo: &Repository) -> Result<Vec<ReferenceInfo>> {
    let mut refs = Vec::new();

    for reference in repo.references()? {
        let reference = reference?;
        let Some(name) = reference.name().map(|n| n.to_string()) else {
            continue;
        };
        let kind = if reference.is_branch() {
            RefKind::Branch
        } else if reference.is_tag() {
            RefKind::Tag
        } else {
            RefKind::Other
        };
        let short_name = reference.shorthand().unwrap_or(name.as_str()).to_string();

        let resolved = reference.resolve()?;
        let Some(target) = resolved.target() else {
            continue;
        };

        let obj = GitObject::classify(repo.find_object(target, None)?)?;
        let message = match &obj {
            GitObject::Tag(tag) => tag.message().map(|m| m.trim().to_string()),
            GitObject::Commit(_) | GitObject::Tree(_) | GitObject::Blob(_) => None,
        };
        let commit = obj.peel_tags().ok().and_then(|o| o.into_commit().ok());

        refs.push(ReferenceInfo {
            name,
            short_name,
            kind,
            target: target.to_string(),
            commit: commit.as_ref().map(|c| c.id().to_string()),
            message,
            timestamp: commit.as_ref().map(|c| c.time().seconds()),
        });
    }

    refs.sort_by(|a, b| {
        let rank = |k: RefKind| match k {
            RefKind::Branch => 0,
            RefKind::Tag => 1,
            RefKind::Other => 2,
        };
        rank(a.kind).cmp(&rank(b.kind)).then_with(|| match a.kind {
            RefKind::Tag => b.timestamp.cmp(&a.timestamp).then_with(|| a.name.cmp(&b.name)),
            RefKind::Branch | RefKind::Other => a.name.cmp(&b.name),
        })
    });

    Ok(refs)
}

impl GitRepository {
    pub fn list_references(&self) -> Result<Vec<ReferenceInfo>> {
        self.with_repo(list_references)
    }

    /// Resolve `(ref, path)` and return the commit id, ref name and
    /// remaining path.
    pub fn resolve(&self, ref_name: Option<&str>, path: Option<&str>) -> Result<(String, String, String)> {
        self.with_repo(|repo| {
            let resolved = resolve_ref(repo, ref_name, path, self.default_branch_override())?;
            Ok((resolved.commit.id().to_string(), resolved.ref_name, resolved.path))
        })
    }
}
