//! The browsing engine: everything that reads the object store.
//!
//! - `refs`: ref/path resolution and reference listing
//! - `annotate`: last-change annotation of tree entries
//! - `tree`: directory listings and blobs
//! - `history`: path-filtered, paginated commit walks
//! - `blame`: line attribution reduced to display hunks
//! - `diff`: diffs and diffstats
//! - `editorconfig`, `glob`: effective formatting settings
//! - `export`: archives and patches via the `git` binary

pub mod annotate;
pub mod blame;
pub mod diff;
pub mod editorconfig;
pub mod export;
pub mod glob;
pub mod history;
pub mod object;
pub mod refs;
pub mod repository;
pub mod tree;

pub use repository::GitRepository;
