//! API route handlers - maps HTTP endpoints to engine operations.
//!
//! Each submodule defines routes for a feature area:
//! - `repository`: Basic repo info (GET /api/v1/repository)
//! - `refs`: Branch and tag listing
//! - `tree`: Annotated directory listing and file content
//! - `commits`: Paginated history and single commits
//! - `diff`: Diff and diffstat between commits
//! - `blame`: Consolidated line attribution
//! - `editorconfig`: Effective formatting settings for a path
//! - `export`: Archives and patches

pub mod blame;
pub mod commits;
pub mod diff;
pub mod editorconfig;
pub mod export;
pub mod refs;
pub mod repository;
pub mod tree;

use std::sync::Arc;

use axum::Router;

use crate::config::Config;
use crate::git::GitRepository;

/// State shared by every handler.
pub struct AppState {
    pub repo: GitRepository,
    pub config: Config,
}

pub type SharedState = Arc<AppState>;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .merge(repository::routes(state.clone()))
        .merge(refs::routes(state.clone()))
        .merge(tree::routes(state.clone()))
        .merge(commits::routes(state.clone()))
        .merge(diff::routes(state.clone()))
        .merge(blame::routes(state.clone()))
        .merge(editorconfig::routes(state.clone()))
        .merge(export::routes(state))
}
