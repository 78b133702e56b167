use git2::{Repository, Signature};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::cache::Cache;
use crate::error::{AppError, Result};
use crate::git::refs::default_branch;
use crate::models::{CommitDetail, CommitInfo, Person, RepositoryInfo};

/// A local repository plus the cache its derived views are memoized in.
///
/// The native handle is only reachable through `with_repo`, which holds
/// the lock for the duration of the closure and releases it on every exit
/// path.
pub struct GitRepository {
    repo: Mutex<Repository>,
    pub path: String,
    default_branch: Option<String>,
    cache: Arc<dyn Cache>,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(
        path: P,
        default_branch: Option<String>,
        cache: Arc<dyn Cache>,
    ) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo = Repository::discover(&path)
            .map_err(|_| AppError::NotFound(format!("repository {}", path_str)))?;

        tracing::debug!(path = %path_str, "Opened repository");

        Ok(Self {
            repo: Mutex::new(repo),
            path: path_str,
            default_branch,
            cache,
        })
    }

    pub fn info(&self) -> Result<RepositoryInfo> {
        self.with_repo(|repo| {
            let name = Path::new(&self.path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string());

            let default_branch = default_branch(repo, self.default_branch_override()).ok();
            let head_commit = default_branch.as_ref().and_then(|b| {
                repo.revparse_single(b)
                    .and_then(|o| o.peel_to_commit())
                    .ok()
                    .map(|c| commit_to_info(&c))
            });

            Ok(RepositoryInfo {
                name,
                path: self.path.clone(),
                default_branch,
                head_commit,
                is_bare: repo.is_bare(),
                is_empty: repo.is_empty().unwrap_or(true),
            })
        })
    }

    pub fn with_repo<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Repository) -> Result<T>,
    {
        let repo = self.repo.lock().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        f(&repo)
    }

    pub fn cache(&self) -> &dyn Cache {
        self.cache.as_ref()
    }

    pub fn default_branch_override(&self) -> Option<&str> {
        self.default_branch.as_deref()
    }

    /// Short display name of the repository, used as an archive prefix.
    pub fn name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map(|n| n.to_string_lossy().trim_end_matches(".git").to_string())
            .unwrap_or_else(|| "repository".to_string())
    }
}

/// First line of a commit message.
pub fn subject(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim_end()
}

pub fn short_id(oid: &git2::Oid) -> String {
    oid.to_string().chars().take(7).collect()
}

pub fn commit_to_info(commit: &git2::Commit) -> CommitInfo {
    let timestamp = commit.time().seconds();
    CommitInfo {
        oid: commit.id().to_string(),
        message: subject(commit.message().unwrap_or("")).to_string(),
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        timestamp,
        relative_time: format_relative_time(timestamp),
    }
}

pub fn commit_to_detail(commit: &git2::Commit) -> CommitDetail {
    let message = commit.message().unwrap_or("").to_string();
    CommitDetail {
        oid: commit.id().to_string(),
        short_id: short_id(&commit.id()),
        subject: subject(&message).to_string(),
        author: signature_to_person(&commit.author()),
        committer: signature_to_person(&commit.committer()),
        relative_time: format_relative_time(commit.time().seconds()),
        tree: commit.tree_id().to_string(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        message,
    }
}

pub fn signature_to_person(sig: &Signature) -> Person {
    Person {
        name: sig.name().unwrap_or("Unknown").to_string(),
        email: sig.email().unwrap_or("").to_string(),
        timestamp: sig.when().seconds(),
        offset_minutes: sig.when().offset_minutes(),
    }
}

pub fn format_relative_time(timestamp: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let diff = now - timestamp;

    let (value, unit) = match diff {
        d if d < 60 => return "just now".to_string(),
        d if d < 3600 => (d / 60, "minute"),
        d if d < 86400 => (d / 3600, "hour"),
        d if d < 2592000 => (d / 86400, "day"),
        d if d < 31536000 => (d / 2592000, "month"),
        d => (d / 31536000, "year"),
    };

    format!("{} {}{} ago", value, unit, if value == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_is_first_line() {
        assert_eq!(subject("Fix parser\n\nLonger body"), "Fix parser");
        assert_eq!(subject("single line"), "single line");
        assert_eq!(subject(""), "");
    }

    #[test]
    fn test_relative_time() {
        let now = chrono::Utc::now().timestamp();
        assert_eq!(format_relative_time(now), "just now");
        assert_eq!(format_relative_time(now - 120), "2 minutes ago");
        assert_eq!(format_relative_time(now - 3600), "1 hour ago");
        assert_eq!(format_relative_time(now - 3 * 86400), "3 days ago");
        assert_eq!(format_relative_time(now - 2 * 31536000), "2 years ago");
    }
}
