use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{DiffResponse, DiffStatResponse};
use crate::routes::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/repository/diff", get(get_diff))
        .route("/api/v1/repository/diffstat", get(get_diffstat))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DiffQuery {
    from: Option<String>,
    to: String,
    path: Option<String>,
}

async fn get_diff(
    State(state): State<SharedState>,
    Query(query): Query<DiffQuery>,
) -> Result<Json<DiffResponse>> {
    let response = state.repo.get_diff(
        query.from.as_deref(),
        &query.to,
        query.path.as_deref(),
    )?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct DiffStatQuery {
    from: Option<String>,
    to: String,
}

async fn get_diffstat(
    State(state): State<SharedState>,
    Query(query): Query<DiffStatQuery>,
) -> Result<Json<DiffStatResponse>> {
    let response = state.repo.get_diffstat(query.from.as_deref(), &query.to)?;
    Ok(Json(response))
}
