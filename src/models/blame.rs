//! Blame data transfer objects.
//!
//! Blame is returned as consolidated hunks: runs of consecutive lines last
//! changed by the same commit. `lines` holds the file content so a renderer
//! can pair each hunk with its text.

use serde::{Deserialize, Serialize};

/// Response for blame request on a file at a specific ref.
#[derive(Debug, Serialize)]
pub struct BlameResponse {
    /// Ref the request resolved to
    pub ref_name: String,
    /// Path of the file
    pub path: String,
    /// Commit OID where blame was calculated
    pub commit: String,
    pub hunks: Vec<BlameHunk>,
    /// File content split into lines
    pub lines: Vec<String>,
}

/// A display hunk: `lines` consecutive lines starting at `start_line`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlameHunk {
    pub commit: String,
    pub committer_name: String,
    pub committer_email: String,
    /// First line of the hunk (1-indexed)
    pub start_line: usize,
    pub lines: usize,
}
