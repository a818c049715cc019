//! Latest-image preview and download handlers.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::model::CompositionResult;

use super::super::state::AppState;

/// Handle GET /api/image - latest image, displayed inline.
pub async fn preview(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let image = latest(&state).await?;
    Ok((
        [
            (header::CONTENT_TYPE, CompositionResult::MIME.to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        image.bytes,
    ))
}

/// Handle GET /api/image/download - latest image as a file attachment.
pub async fn download(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let image = latest(&state).await?;
    Ok((
        [
            (header::CONTENT_TYPE, CompositionResult::MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CompositionResult::DOWNLOAD_NAME),
            ),
        ],
        image.bytes,
    ))
}

async fn latest(state: &AppState) -> Result<CompositionResult, (StatusCode, String)> {
    state
        .studio
        .latest()
        .await
        .ok_or((StatusCode::NOT_FOUND, "No image has been generated yet".to_string()))
}
