//! Generation API handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::error::AdhyatmikError;
use crate::model::CaptionRequest;

use super::super::state::AppState;

/// Successful generation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub image_data_url: String,
    pub width: u32,
    pub height: u32,
}

/// HTTP status for each failure kind.
pub fn status_for(err: &AdhyatmikError) -> StatusCode {
    match err {
        AdhyatmikError::Validation(_) => StatusCode::BAD_REQUEST,
        AdhyatmikError::Busy => StatusCode::CONFLICT,
        AdhyatmikError::Upstream(_) => StatusCode::BAD_GATEWAY,
        AdhyatmikError::Asset(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdhyatmikError::Surface(_) | AdhyatmikError::Config(_) | AdhyatmikError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Handle POST /api/generate - run the full pipeline for a caption.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CaptionRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<Value>)> {
    match state.studio.submit(&request).await {
        Ok(image) => Ok(Json(GenerateResponse {
            success: true,
            image_data_url: image.to_data_url(),
            width: image.width,
            height: image.height,
        })),
        Err(e) => Err((
            status_for(&e),
            Json(json!({ "success": false, "error": e.user_message() })),
        )),
    }
}
