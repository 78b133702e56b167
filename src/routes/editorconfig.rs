use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::EditorConfigResponse;
use crate::routes::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/repository/editorconfig", get(get_editorconfig))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct EditorConfigQuery {
    #[serde(rename = "ref")]
    ref_name: Option<String>,
    path: String,
}

async fn get_editorconfig(
    State(state): State<SharedState>,
    Query(query): Query<EditorConfigQuery>,
) -> Result<Json<EditorConfigResponse>> {
    let response = state
        .repo
        .get_editorconfig(query.ref_name.as_deref(), Some(&query.path))?;
    Ok(Json(response))
}
