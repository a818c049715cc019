//! Shared helpers for integration tests: a scripted backend and in-memory
//! backgrounds.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

use adhyatmik::AdhyatmikError;
use adhyatmik::Compositor;
use adhyatmik::compose::font::FontBook;
use adhyatmik::config::EngineConfig;
use adhyatmik::error::Result;
use adhyatmik::model::{AspectRatio, FontStyle, GenerationPlan, PlacementDirective};
use adhyatmik::services::CreativeBackend;

/// Which collaborator call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Plan,
    Synthesize,
    Analyze,
}

/// Backend that returns canned outputs and counts every call.
pub struct ScriptedBackend {
    pub background: String,
    pub directive: PlacementDirective,
    fail_at: Mutex<Option<FailAt>>,
    /// When set, planning waits for a notification before returning.
    pub gate: Option<Arc<Notify>>,
    pub plan_calls: AtomicUsize,
    pub synth_calls: AtomicUsize,
    pub analyze_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(background_png: &[u8]) -> Self {
        Self {
            background: base64::engine::general_purpose::STANDARD.encode(background_png),
            directive: directive("शुभ प्रभात"),
            fail_at: Mutex::new(None),
            gate: None,
            plan_calls: AtomicUsize::new(0),
            synth_calls: AtomicUsize::new(0),
            analyze_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_at(self, stage: FailAt) -> Self {
        self.set_failure(Some(stage));
        self
    }

    /// Change which call fails for subsequent requests.
    pub fn set_failure(&self, stage: Option<FailAt>) {
        if let Ok(mut fail_at) = self.fail_at.lock() {
            *fail_at = stage;
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_background_b64(mut self, encoded: impl Into<String>) -> Self {
        self.background = encoded.into();
        self
    }

    pub fn total_calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
            + self.synth_calls.load(Ordering::SeqCst)
            + self.analyze_calls.load(Ordering::SeqCst)
    }

    fn check(&self, stage: FailAt) -> Result<()> {
        let scripted = self.fail_at.lock().map(|f| *f).unwrap_or(None);
        if scripted == Some(stage) {
            return Err(AdhyatmikError::Upstream(format!("scripted {:?} failure", stage)));
        }
        Ok(())
    }
}

#[async_trait]
impl CreativeBackend for ScriptedBackend {
    async fn plan_generation(&self, caption: &str) -> Result<GenerationPlan> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.check(FailAt::Plan)?;
        Ok(GenerationPlan {
            image_prompt: format!("serene temple at dawn for: {}", caption),
            hindi_text: caption.to_string(),
            theme: "devotional".to_string(),
        })
    }

    async fn synthesize_background(
        &self,
        _image_prompt: &str,
        _aspect_ratio: AspectRatio,
    ) -> Result<String> {
        self.synth_calls.fetch_add(1, Ordering::SeqCst);
        self.check(FailAt::Synthesize)?;
        Ok(self.background.clone())
    }

    async fn analyze_placement(
        &self,
        _background: &[u8],
        hindi_text: &str,
        _theme: &str,
    ) -> Result<PlacementDirective> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.check(FailAt::Analyze)?;
        Ok(PlacementDirective {
            hindi_text: hindi_text.to_string(),
            ..self.directive.clone()
        })
    }
}

/// A centered, white, shadowed directive.
pub fn directive(text: &str) -> PlacementDirective {
    PlacementDirective {
        hindi_text: text.to_string(),
        x: 50.0,
        y: 50.0,
        font_size: 10.0,
        font_style: FontStyle::BoldSansSerif,
        text_color: Some("#FFFFFF".to_string()),
        shadow_color: "rgba(0,0,0,0.7)".to_string(),
        shadow_blur: 8.0,
    }
}

/// Solid-color PNG of the given size.
pub fn png_background(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 60, 120]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("encode test background");
    out.into_inner()
}

/// Compositor using only the compiled-in face, so renders match on every host.
pub fn compositor() -> Arc<Compositor> {
    Arc::new(Compositor::with_fonts(
        FontBook::bundled(),
        EngineConfig::default(),
    ))
}
