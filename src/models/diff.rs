//! Diff-related DTOs.
//!
//! - `DiffResponse`: Complete diff with files and stats
//! - `FileDiff`: Single file's changes with hunks
//! - `DiffHunk`: Contiguous block of changes with context
//! - `DiffLine`: Single line (addition, deletion, or context)
//! - `DiffStatResponse`: Diffstat summary with one display line per path

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResponse {
    pub from_commit: Option<String>,
    pub to_commit: String,
    pub path: Option<String>,
    pub files: Vec<FileDiff>,
    pub stats: DiffStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub status: DiffStatus,
    pub old_mode: String,
    pub new_mode: String,
    pub hunks: Vec<DiffHunk>,
    pub is_binary: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    TypeChanged,
    Unmodified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub header: String,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLine {
    pub line_type: LineType,
    pub old_lineno: Option<u32>,
    pub new_lineno: Option<u32>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Context,
    Addition,
    Deletion,
    Header,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

/// One row of a diffstat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffStatLine {
    /// Full line, e.g. `run.sh (mode 100644 => 100755)`
    pub line: String,
    /// Path as displayed, e.g. `src/{foo.c => bar.c}`
    pub display: String,
    pub status: DiffStatus,
    pub insertions: usize,
    pub deletions: usize,
    /// e.g. `100644 => 100755`
    pub mode_change: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffStatResponse {
    pub from_commit: Option<String>,
    pub to_commit: String,
    /// e.g. ` 2 files changed, 3 insertions(+), 1 deletion(-)`
    pub summary: String,
    pub stats: DiffStats,
    pub files: Vec<DiffStatLine>,
}
