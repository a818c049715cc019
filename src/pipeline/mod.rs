//! # Generation Pipeline
//!
//! Sequences the collaborator calls and hands their outputs to the
//! compositing engine:
//!
//! ```text
//! validate ─► plan ─► synthesize ─► analyze ─► decode ─► compose
//!    │          │          │            │          │         │
//!    └──────────┴──────────┴─ first error short-circuits ────┘
//! ```
//!
//! While stages run, a [`StatusTicker`] rotates the status message. It is
//! started only after validation succeeds and is dropped on every exit path
//! (success, error, or the future being cancelled).

pub mod status;
mod studio;

pub use status::{Stage, Status, StatusBoard, StatusTicker};
pub use studio::Studio;

use base64::Engine;
use image::DynamicImage;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::compose::Compositor;
use crate::error::{AdhyatmikError, Result};
use crate::model::{CaptionRequest, CompositionResult};
use crate::services::CreativeBackend;

/// Runs one caption request through every stage.
pub struct Generator {
    backend: Arc<dyn CreativeBackend>,
    compositor: Arc<Compositor>,
    messages: Arc<[String]>,
    status_period: Duration,
}

impl Generator {
    pub fn new(backend: Arc<dyn CreativeBackend>, compositor: Arc<Compositor>) -> Self {
        Self {
            backend,
            compositor,
            messages: status::default_messages(),
            status_period: Duration::from_millis(2500),
        }
    }

    /// Override how often the status message rotates.
    pub fn with_status_period(mut self, period: Duration) -> Self {
        self.status_period = period;
        self
    }

    /// Override the rotating status messages.
    pub fn with_messages(mut self, messages: Vec<String>) -> Self {
        self.messages = messages.into();
        self
    }

    pub fn compositor(&self) -> &Arc<Compositor> {
        &self.compositor
    }

    /// Generate the captioned image for `request`, reporting progress on `status`.
    #[tracing::instrument(skip_all, fields(aspect = %request.aspect_ratio))]
    pub async fn generate(
        &self,
        request: &CaptionRequest,
        status: &StatusBoard,
    ) -> Result<CompositionResult> {
        request.validate()?;

        let started = Instant::now();
        let ticker = StatusTicker::start(status.clone(), self.messages.clone(), self.status_period);
        let result = self.run_stages(request, &ticker).await;
        drop(ticker);

        match &result {
            Ok(image) => tracing::info!(
                width = image.width,
                height = image.height,
                bytes = image.bytes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "image generated"
            ),
            Err(e) => tracing::warn!(error = %e, "generation failed"),
        }
        result
    }

    async fn run_stages(
        &self,
        request: &CaptionRequest,
        ticker: &StatusTicker,
    ) -> Result<CompositionResult> {
        ticker.pin(Stage::Planning);
        let plan = self.backend.plan_generation(&request.caption).await?;

        ticker.pin(Stage::Synthesizing);
        let encoded = self
            .backend
            .synthesize_background(&plan.image_prompt, request.aspect_ratio)
            .await?;
        let background_bytes = decode_base64_image(&encoded)?;

        ticker.pin(Stage::Analyzing);
        let directive = self
            .backend
            .analyze_placement(&background_bytes, &plan.hindi_text, &plan.theme)
            .await?;

        let background = decode_background(background_bytes).await?;

        ticker.pin(Stage::Compositing);
        let compositor = self.compositor.clone();
        let image = tokio::task::spawn_blocking(move || compositor.compose(&background, &directive))
            .await
            .map_err(|e| AdhyatmikError::Surface(format!("compositing task failed: {}", e)))??;

        ticker.pin(Stage::Finishing);
        Ok(image)
    }
}

/// Decode base64 image data, tolerating a `data:` URL prefix and whitespace.
pub fn decode_base64_image(encoded: &str) -> Result<Vec<u8>> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AdhyatmikError::Upstream(format!("background is not valid base64: {}", e)))
}

/// Decode background bytes into an image off the async executor.
pub async fn decode_background(bytes: Vec<u8>) -> Result<DynamicImage> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| AdhyatmikError::Asset(format!("decode task failed: {}", e)))?
        .map_err(|e| AdhyatmikError::Asset(format!("failed to decode background: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_base64() {
        assert_eq!(decode_base64_image("/9j/").unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_decode_data_url_and_whitespace() {
        assert_eq!(
            decode_base64_image("data:image/jpeg;base64,/9j/\n").unwrap(),
            vec![0xFF, 0xD8, 0xFF]
        );
    }

    #[test]
    fn test_bad_base64_is_upstream() {
        assert!(matches!(
            decode_base64_image("not base64!!"),
            Err(AdhyatmikError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_asset_error() {
        let err = decode_background(b"definitely not an image".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AdhyatmikError::Asset(_)));
    }
}
