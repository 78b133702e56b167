//! Reference listing endpoint.
//!
//! GET /api/v1/repository/refs
//!
//! Branches by name, then tags newest first, then any other refs.

use axum::{extract::State, routing::get, Json, Router};

use crate::error::Result;
use crate::models::ReferenceInfo;
use crate::routes::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/repository/refs", get(list_refs))
        .with_state(state)
}

async fn list_refs(State(state): State<SharedState>) -> Result<Json<Vec<ReferenceInfo>>> {
    let refs = state.repo.list_references()?;
    Ok(Json(refs))
}
