use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceInfo {
    /// Full name, e.g. `refs/tags/v1.0`
    pub name: String,
    /// Short name, e.g. `v1.0`
    pub short_name: String,
    pub kind: RefKind,
    /// Object the ref points at directly (a tag object for annotated tags)
    pub target: String,
    /// Commit reached after peeling tags, if any
    pub commit: Option<String>,
    /// Annotated tag message
    pub message: Option<String>,
    /// Commit time of `commit`
    pub timestamp: Option<i64>,
}
