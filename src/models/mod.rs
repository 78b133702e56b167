//! Data transfer objects (DTOs) for API responses.
//!
//! These structs are plain data handed to serialization; none carry
//! behavior.
//! - `tree`: TreeEntry, TreeResponse, BlobResponse, RepositoryInfo, CommitInfo
//! - `commit`: CommitDetail, Person, LogPage
//! - `diff`: DiffResponse, FileDiff, DiffHunk, DiffLine, DiffStatResponse
//! - `blame`: BlameResponse, BlameHunk
//! - `refs`: ReferenceInfo
//! - `editorconfig`: EditorConfigResponse

pub mod blame;
pub mod commit;
pub mod diff;
pub mod editorconfig;
pub mod refs;
pub mod tree;

pub use blame::*;
pub use commit::*;
pub use diff::*;
pub use editorconfig::*;
pub use refs::*;
pub use tree::*;
