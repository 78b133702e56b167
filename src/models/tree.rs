//! Tree and repository-related DTOs.
//!
//! - `TreeEntry`: Single file/directory in a listing, with the commit that
//!   last changed it
//! - `TreeResponse`: A directory listing at a resolved ref
//! - `BlobResponse`: A file at a resolved ref
//! - `RepositoryInfo`: Repo metadata
//! - `CommitInfo`: Short commit info attached to entries

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    pub id: String,
    pub entry_type: EntryType,
    /// Octal file mode, e.g. `100644`
    pub mode: String,
    pub size: Option<u64>,
    pub last_commit: Option<CommitInfo>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    Submodule,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitInfo {
    pub oid: String,
    pub message: String,
    pub author: String,
    pub timestamp: i64,
    pub relative_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub ref_name: String,
    pub commit: String,
    pub path: String,
    pub tree_id: String,
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobResponse {
    pub ref_name: String,
    pub path: String,
    pub id: String,
    pub size: u64,
    pub is_binary: bool,
    /// UTF-8 content; `None` for binary or non-UTF-8 blobs
    pub content: Option<String>,
    pub last_commit: Option<CommitInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub path: String,
    pub default_branch: Option<String>,
    pub head_commit: Option<CommitInfo>,
    pub is_bare: bool,
    pub is_empty: bool,
}
