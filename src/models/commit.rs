use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    /// Offset from UTC in minutes, as recorded in the signature
    pub offset_minutes: i32,
}

/// Full commit metadata as shown in history and commit views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub oid: String,
    pub short_id: String,
    pub subject: String,
    pub message: String,
    pub author: Person,
    pub committer: Person,
    pub relative_time: String,
    pub tree: String,
    pub parents: Vec<String>,
}

/// One page of history.
///
/// `next` is the id of the first commit of the following page; it is only
/// set when `has_more` is true. Totals are never computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPage {
    pub commits: Vec<CommitDetail>,
    pub has_more: bool,
    pub next: Option<String>,
}
