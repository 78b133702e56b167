use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{CommitDetail, LogPage};
use crate::routes::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/repository/log", get(get_log))
        .route("/api/v1/repository/commit/{id}", get(get_commit))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LogQuery {
    #[serde(rename = "ref")]
    ref_name: Option<String>,
    path: Option<String>,
    /// Resume from this commit (the previous page's `next`)
    start: Option<String>,
    /// Exclude this commit and its ancestors
    stop: Option<String>,
    limit: Option<usize>,
}

async fn get_log(
    State(state): State<SharedState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogPage>> {
    let limit = query.limit.unwrap_or(state.config.page_size);
    let page = state.repo.get_log(
        query.ref_name.as_deref(),
        query.path.as_deref(),
        query.start.as_deref(),
        query.stop.as_deref(),
        limit,
    )?;
    Ok(Json(page))
}

async fn get_commit(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CommitDetail>> {
    let commit = state.repo.get_commit(&id)?;
    Ok(Json(commit))
}
