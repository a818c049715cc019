//! # AI Collaborators
//!
//! The three generative stages the pipeline depends on, behind one trait so
//! the orchestrator can be driven by the real Gemini backend or by a test
//! double.
//!
//! | Stage | Input | Output |
//! |-------|-------|--------|
//! | plan | caption | [`GenerationPlan`] |
//! | synthesize | image prompt, aspect ratio | base64 image bytes |
//! | analyze | background bytes, hindi text, theme | [`PlacementDirective`] |
//!
//! Every failure (transport, HTTP status, malformed payload) is reported as
//! [`AdhyatmikError::Upstream`](crate::error::AdhyatmikError::Upstream).

pub mod gemini;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{AspectRatio, GenerationPlan, PlacementDirective};

pub use gemini::GeminiBackend;

/// The external generative services consumed by the pipeline.
#[async_trait]
pub trait CreativeBackend: Send + Sync {
    /// Turn a raw caption into an image prompt, normalized text and theme.
    async fn plan_generation(&self, caption: &str) -> Result<GenerationPlan>;

    /// Produce a background image; returns base64-encoded image bytes.
    async fn synthesize_background(
        &self,
        image_prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<String>;

    /// Decide where and how the caption goes on the background.
    async fn analyze_placement(
        &self,
        background: &[u8],
        hindi_text: &str,
        theme: &str,
    ) -> Result<PlacementDirective>;
}
