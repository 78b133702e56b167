use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{BlobResponse, TreeResponse};
use crate::routes::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/repository/tree", get(get_tree))
        .route("/api/v1/repository/blob", get(get_blob))
        .with_state(state)
}

/// `ref` may be omitted; `path` may then start with a ref name.
#[derive(Debug, Deserialize)]
struct RefPathQuery {
    #[serde(rename = "ref")]
    ref_name: Option<String>,
    path: Option<String>,
}

async fn get_tree(
    State(state): State<SharedState>,
    Query(query): Query<RefPathQuery>,
) -> Result<Json<TreeResponse>> {
    let tree = state
        .repo
        .get_tree(query.ref_name.as_deref(), query.path.as_deref())?;
    Ok(Json(tree))
}

async fn get_blob(
    State(state): State<SharedState>,
    Query(query): Query<RefPathQuery>,
) -> Result<Json<BlobResponse>> {
    let blob = state
        .repo
        .get_blob(query.ref_name.as_deref(), query.path.as_deref())?;
    Ok(Json(blob))
}
