//! Blame endpoint.
//!
//! GET /api/v1/repository/blame?ref=<optional>&path=<path>
//!
//! Returns the file's lines plus attribution hunks, with adjacent hunks
//! from the same commit merged.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::BlameResponse;
use crate::routes::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/repository/blame", get(get_blame))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct BlameQuery {
    #[serde(rename = "ref")]
    ref_name: Option<String>,
    path: String,
}

async fn get_blame(
    State(state): State<SharedState>,
    Query(query): Query<BlameQuery>,
) -> Result<Json<BlameResponse>> {
    let response = state
        .repo
        .get_blame(query.ref_name.as_deref(), Some(&query.path))?;
    Ok(Json(response))
}
