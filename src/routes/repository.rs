use axum::{extract::State, routing::get, Json, Router};

use crate::error::Result;
use crate::models::RepositoryInfo;
use crate::routes::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/repository", get(get_repository_info))
        .with_state(state)
}

async fn get_repository_info(State(state): State<SharedState>) -> Result<Json<RepositoryInfo>> {
    let info = state.repo.info()?;
    Ok(Json(info))
}
