//! Closed view over the four git object kinds.
//!
//! Every consumer matches on `GitObject` exhaustively instead of probing
//! object types at runtime.

use git2::{Blob, Commit, Object, ObjectType, Tag, Tree};

use crate::error::{AppError, Result};

pub enum GitObject<'r> {
    Commit(Commit<'r>),
    Tree(Tree<'r>),
    Blob(Blob<'r>),
    Tag(Tag<'r>),
}

impl<'r> GitObject<'r> {
    pub fn classify(obj: Object<'r>) -> Result<Self> {
        let id = obj.id();
        let kind = obj.kind();
        let wrong_kind = |_| AppError::InvalidState(format!("object {} has a mismatched type", id));
        match kind {
            Some(ObjectType::Commit) => obj.into_commit().map(GitObject::Commit).map_err(wrong_kind),
            Some(ObjectType::Tree) => obj.into_tree().map(GitObject::Tree).map_err(wrong_kind),
            Some(ObjectType::Blob) => obj.into_blob().map(GitObject::Blob).map_err(wrong_kind),
            Some(ObjectType::Tag) => obj.into_tag().map(GitObject::Tag).map_err(wrong_kind),
            _ => Err(AppError::InvalidState(format!("object {} has an unknown type", id))),
        }
    }

    /// Follow annotated tags until a non-tag object is reached.
    ///
    /// Tags may point at other tags, so this loops rather than peeling once.
    pub fn peel_tags(self) -> Result<Self> {
        let mut current = self;
        loop {
            match current {
                GitObject::Tag(tag) => {
                    tracing::debug!(tag = %tag.id(), target = %tag.target_id(), "Peeling tag");
                    current = GitObject::classify(tag.target()?)?;
                }
                other @ (GitObject::Commit(_) | GitObject::Tree(_) | GitObject::Blob(_)) => {
                    return Ok(other);
                }
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            GitObject::Commit(_) => "commit",
            GitObject::Tree(_) => "tree",
            GitObject::Blob(_) => "blob",
            GitObject::Tag(_) => "tag",
        }
    }

    pub fn into_commit(self) -> Result<Commit<'r>> {
        match self {
            GitObject::Commit(c) => Ok(c),
            other @ (GitObject::Tree(_) | GitObject::Blob(_) | GitObject::Tag(_)) => Err(
                AppError::InvalidState(format!("expected a commit, found a {}", other.kind_name())),
            ),
        }
    }
}
