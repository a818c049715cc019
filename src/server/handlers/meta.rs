//! Status and form metadata handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::model::AspectRatio;
use crate::pipeline::Status;

use super::super::state::AppState;

/// Example captions offered as one-click starting points.
pub const EXAMPLE_CAPTIONS: &[&str] = &[
    "!! श्री कृष्ण कहते हैं !! कर्म करो, फल की चिंता मत करो। 🙏",
    "महादेव के भक्त, कैलाश के वासी। 🕉️ हर हर महादेव।",
    "रात की गहराई और चाँदनी, और लिखा हो 'खामोशी में भी एक आवाज़ है...'",
    "एक अकेला योद्धा सूर्यास्त को देख रहा है, और लिखा हो 'जंग अभी खत्म नहीं हुई है। 🔥'",
];

/// One selectable aspect ratio.
#[derive(Debug, Serialize)]
pub struct AspectRatioInfo {
    pub ratio: AspectRatio,
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

/// GET /api/status - current status message.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Status> {
    Json(state.studio.status().current())
}

/// GET /api/aspect-ratios - ratios the user can pick from.
pub async fn aspect_ratios() -> Json<Vec<AspectRatioInfo>> {
    Json(
        AspectRatio::ALL
            .iter()
            .map(|ratio| {
                let (width, height) = ratio.nominal();
                AspectRatioInfo {
                    ratio: *ratio,
                    label: ratio.label(),
                    width,
                    height,
                }
            })
            .collect(),
    )
}

/// GET /api/examples - example captions.
pub async fn examples() -> Json<&'static [&'static str]> {
    Json(EXAMPLE_CAPTIONS)
}
