//! Archive and patch downloads.
//!
//! - GET /api/v1/repository/archive?ref=<ref>&format=tar.gz|tar
//! - GET /api/v1/repository/patch/{id}
//!
//! Both shell out to `git` under the configured export timeout.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::git::export::ArchiveFormat;
use crate::routes::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/repository/archive", get(get_archive))
        .route("/api/v1/repository/patch/{id}", get(get_patch))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ArchiveQuery {
    #[serde(rename = "ref")]
    ref_name: String,
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "tar.gz".to_string()
}

async fn get_archive(
    State(state): State<SharedState>,
    Query(query): Query<ArchiveQuery>,
) -> Result<Response> {
    let format = ArchiveFormat::parse(&query.format)
        .ok_or_else(|| AppError::NotFound(format!("archive format {}", query.format)))?;

    let (stem, bytes) = state
        .repo
        .archive(&query.ref_name, format, state.config.export_timeout())
        .await?;

    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.{}\"", stem, format.extension()),
        ),
    ];
    Ok((headers, bytes).into_response())
}

async fn get_patch(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Response> {
    let bytes = state.repo.patch(&id, state.config.export_timeout()).await?;
    Ok(([(header::CONTENT_TYPE, "text/x-patch; charset=utf-8")], bytes).into_response())
}
