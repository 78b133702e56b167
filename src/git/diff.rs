use git2::{Delta, Diff, DiffDelta, DiffFindOptions, DiffOptions, FileMode, Repository};

use crate::error::Result;
use crate::git::refs::resolve_cursor;
use crate::git::repository::GitRepository;
use crate::models::{
    DiffHunk, DiffLine, DiffResponse, DiffStatLine, DiffStatResponse, DiffStats, DiffStatus,
    FileDiff, LineType,
};

pub fn status_of(delta: Delta) -> DiffStatus {
    match delta {
        Delta::Added => DiffStatus::Added,
        Delta::Deleted => DiffStatus::Deleted,
        Delta::Modified => DiffStatus::Modified,
        Delta::Renamed => DiffStatus::Renamed,
        Delta::Copied => DiffStatus::Copied,
        Delta::Typechange => DiffStatus::TypeChanged,
        _ => DiffStatus::Unmodified,
    }
}

pub fn mode_bits(mode: FileMode) -> u32 {
    match mode {
        FileMode::Tree => 0o040000,
        FileMode::Blob => 0o100644,
        FileMode::BlobGroupWritable => 0o100664,
        FileMode::BlobExecutable => 0o100755,
        FileMode::Link => 0o120000,
        FileMode::Commit => 0o160000,
        _ => 0,
    }
}

/// Byte length of the longest common prefix of `a` and `b` that ends
/// with a `/`.
fn common_dir_prefix(a: &str, b: &str) -> usize {
    let mut end = 0;
    for ((i, ca), cb) in a.char_indices().zip(b.chars()) {
        if ca != cb {
            break;
        }
        if ca == '/' {
            end = i + 1;
        }
    }
    end
}

/// Render an old/new path pair compactly: `src/{foo.c => bar.c}`, or
/// `a.c => b/a.c` when no directory is shared.
pub fn format_rename(old: &str, new: &str) -> String {
    if old == new {
        return old.to_string();
    }
    let prefix = common_dir_prefix(old, new);
    if prefix > 0 {
        format!("{}{{{} => {}}}", &old[..prefix], &old[prefix..], &new[prefix..])
    } else {
        format!("{} => {}", old, new)
    }
}

/// Display path for one delta. Deleted files show only the old path.
pub fn display_path(status: DiffStatus, old: Option<&str>, new: Option<&str>) -> String {
    match (status, old, new) {
        (DiffStatus::Deleted, Some(old), _) => old.to_string(),
        (_, Some(old), Some(new)) => format_rename(old, new),
        (_, Some(path), None) | (_, None, Some(path)) => path.to_string(),
        (_, None, None) => String::new(),
    }
}

/// `old => new` octal modes, unless the file was only added or deleted.
pub fn mode_change(status: DiffStatus, old_mode: u32, new_mode: u32) -> Option<String> {
    match status {
        DiffStatus::Added | DiffStatus::Deleted => None,
        _ if old_mode == new_mode => None,
        _ => Some(format!("{:06o} => {:06o}", old_mode, new_mode)),
    }
}

/// The per-path line: display path, then the mode change if any.
pub fn stat_line(display: &str, mode_change: Option<&str>) -> String {
    match mode_change {
        Some(modes) => format!("{} (mode {})", display, modes),
        None => display.to_string(),
    }
}

/// Diffstat summary worded like git's.
pub fn summary_line(stats: &DiffStats) -> String {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    let mut line = format!(
        " {} file{} changed",
        stats.files_changed,
        plural(stats.files_changed)
    );
    if stats.insertions > 0 || stats.deletions == 0 {
        line.push_str(&format!(
            ", {} insertion{}(+)",
            stats.insertions,
            plural(stats.insertions)
        ));
    }
    if stats.deletions > 0 || stats.insertions == 0 {
        line.push_str(&format!(
            ", {} deletion{}(-)",
            stats.deletions,
            plural(stats.deletions)
        ));
    }
    line
}

fn delta_paths(delta: &DiffDelta) -> (Option<String>, Option<String>) {
    (
        delta.old_file().path().map(|p| p.to_string_lossy().to_string()),
        delta.new_file().path().map(|p| p.to_string_lossy().to_string()),
    )
}

/// Diff `to` against `from`, or against its first parent (the empty tree
/// for a root commit). Renames are detected.
fn commit_diff<'r>(
    repo: &'r Repository,
    from: Option<&str>,
    to: &str,
    path: Option<&str>,
    context_lines: u32,
) -> Result<Diff<'r>> {
    let to = resolve_cursor(repo, to)?;
    let to_tree = to.tree()?;

    let from_tree = match from {
        Some(from) => Some(resolve_cursor(repo, from)?.tree()?),
        None if to.parent_count() > 0 => Some(to.parent(0)?.tree()?),
        None => None,
    };

    let mut opts = DiffOptions::new();
    opts.context_lines(context_lines);
    if let Some(p) = path.filter(|p| !p.is_empty()) {
        opts.pathspec(p);
    }

    let mut diff = repo.diff_tree_to_tree(from_tree.as_ref(), Some(&to_tree), Some(&mut opts))?;
    let mut find = DiffFindOptions::new();
    find.renames(true);
    diff.find_similar(Some(&mut find))?;
    Ok(diff)
}

impl GitRepository {
    pub fn get_diff(
        &self,
        from_commit: Option<&str>,
        to_commit: &str,
        path: Option<&str>,
    ) -> Result<DiffResponse> {
        self.with_repo(|repo| {
            let diff = commit_diff(repo, from_commit, to_commit, path, 3)?;

            let mut files: Vec<FileDiff> = Vec::new();
            let mut stats = DiffStats::default();

            for (delta_idx, delta) in diff.deltas().enumerate() {
                let (old_path, new_path) = delta_paths(&delta);

                let mut hunks: Vec<DiffHunk> = Vec::new();
                if let Some(patch) = git2::Patch::from_diff(&diff, delta_idx)? {
                    for hunk_idx in 0..patch.num_hunks() {
                        let (hunk, _) = patch.hunk(hunk_idx)?;

                        let mut lines: Vec<DiffLine> = Vec::new();
                        for line_idx in 0..patch.num_lines_in_hunk(hunk_idx)? {
                            let line = patch.line_in_hunk(hunk_idx, line_idx)?;

                            let line_type = match line.origin() {
                                '+' => {
                                    stats.insertions += 1;
                                    LineType::Addition
                                }
                                '-' => {
                                    stats.deletions += 1;
                                    LineType::Deletion
                                }
                                ' ' => LineType::Context,
                                _ => LineType::Header,
                            };

                            lines.push(DiffLine {
                                line_type,
                                old_lineno: line.old_lineno(),
                                new_lineno: line.new_lineno(),
                                content: String::from_utf8_lossy(line.content()).to_string(),
                            });
                        }

                        hunks.push(DiffHunk {
                            old_start: hunk.old_start(),
                            old_lines: hunk.old_lines(),
                            new_start: hunk.new_start(),
                            new_lines: hunk.new_lines(),
                            header: String::from_utf8_lossy(hunk.header()).to_string(),
                            lines,
                        });
                    }
                }

                files.push(FileDiff {
                    old_path,
                    new_path,
                    status: status_of(delta.status()),
                    old_mode: format!("{:06o}", mode_bits(delta.old_file().mode())),
                    new_mode: format!("{:06o}", mode_bits(delta.new_file().mode())),
                    hunks,
                    is_binary: delta.flags().is_binary(),
                });

                stats.files_changed += 1;
            }

            Ok(DiffResponse {
                from_commit: from_commit.map(|s| s.to_string()),
                to_commit: to_commit.to_string(),
                path: path.map(|s| s.to_string()),
                files,
                stats,
            })
        })
    }

    /// Diffstat between two commits, one display line per changed path.
    pub fn get_diffstat(&self, from_commit: Option<&str>, to_commit: &str) -> Result<DiffStatResponse> {
        self.with_repo(|repo| {
            let diff = commit_diff(repo, from_commit, to_commit, None, 0)?;

            let mut files = Vec::new();
            let mut stats = DiffStats::default();

            for (delta_idx, delta) in diff.deltas().enumerate() {
                let status = status_of(delta.status());
                let (old_path, new_path) = delta_paths(&delta);

                let (insertions, deletions) = match git2::Patch::from_diff(&diff, delta_idx)? {
                    Some(patch) => {
                        let (_, added, removed) = patch.line_stats()?;
                        (added, removed)
                    }
                    None => (0, 0),
                };

                stats.files_changed += 1;
                stats.insertions += insertions;
                stats.deletions += deletions;

                let display = display_path(status, old_path.as_deref(), new_path.as_deref());
                let modes = mode_change(
                    status,
                    mode_bits(delta.old_file().mode()),
                    mode_bits(delta.new_file().mode()),
                );
                files.push(DiffStatLine {
                    line: stat_line(&display, modes.as_deref()),
                    display,
                    status,
                    insertions,
                    deletions,
                    mode_change: modes,
                });
            }

            Ok(DiffStatResponse {
                from_commit: from_commit.map(|s| s.to_string()),
                to_commit: to_commit.to_string(),
                summary: summary_line(&stats),
                stats,
                files,
            })
        })
    }
}
