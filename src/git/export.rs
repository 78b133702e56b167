//! Archive and patch generation through the `git` binary.

use std::ffi::OsStr;
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::git::refs::{resolve_cursor, resolve_ref};
use crate::git::repository::GitRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Tar,
}

impl ArchiveFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tar.gz" | "tgz" => Some(Self::TarGz),
            "tar" => Some(Self::Tar),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Tar => "tar",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::TarGz => "application/gzip",
            Self::Tar => "application/x-tar",
        }
    }
}

/// Run `program` and collect its stdout, killing it if it outlives
/// `limit`.
pub async fn run_bounded<I, S>(program: &str, args: I, limit: Duration) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let started = Instant::now();
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(limit, output).await {
        Ok(output) => output?,
        Err(_) => {
            tracing::warn!(program, "Subprocess timed out after {:?}", limit);
            return Err(AppError::Timeout(format!("{} exceeded {:?}", program, limit)));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::error!(program, status = %output.status, stderr = %stderr, "Subprocess failed");
        return Err(AppError::Backend(stderr));
    }

    tracing::debug!(program, bytes = output.stdout.len(), "Subprocess finished in {:?}", started.elapsed());
    Ok(output.stdout)
}

/// Archive file stem: `<repo>-<ref>` with slashes in the ref flattened.
pub fn archive_stem(repo_name: &str, ref_name: &str) -> String {
    format!("{}-{}", repo_name, ref_name.replace('/', "-"))
}

impl GitRepository {
    fn git_dir(&self) -> Result<String> {
        self.with_repo(|repo| Ok(repo.path().to_string_lossy().to_string()))
    }

    /// Snapshot of `ref_name` as an archive whose entries sit under
    /// `<repo>-<ref>/`. Returns the archive stem and its bytes.
    pub async fn archive(
        &self,
        ref_name: &str,
        format: ArchiveFormat,
        limit: Duration,
    ) -> Result<(String, Vec<u8>)> {
        let commit = self.with_repo(|repo| {
            let resolved = resolve_ref(repo, Some(ref_name), None, self.default_branch_override())?;
            Ok(resolved.commit.id().to_string())
        })?;
        let git_dir = self.git_dir()?;
        let stem = archive_stem(&self.name(), ref_name);

        let format_arg = format!("--format={}", format.extension());
        let prefix_arg = format!("--prefix={}/", stem);
        let args = [
            "--git-dir",
            git_dir.as_str(),
            "archive",
            format_arg.as_str(),
            prefix_arg.as_str(),
            commit.as_str(),
        ];
        tracing::info!(ref_name, commit = %commit, format = format.extension(), "Generating archive");

        let bytes = run_bounded("git", args, limit).await?;
        Ok((stem, bytes))
    }

    /// `git format-patch` output for a single commit.
    pub async fn patch(&self, id: &str, limit: Duration) -> Result<Vec<u8>> {
        let commit = self.with_repo(|repo| Ok(resolve_cursor(repo, id)?.id().to_string()))?;
        let git_dir = self.git_dir()?;

        let args = [
            "--git-dir",
            git_dir.as_str(),
            "format-patch",
            "--stdout",
            "-1",
            commit.as_str(),
        ];
        run_bounded("git", args, limit).await
    }
}
