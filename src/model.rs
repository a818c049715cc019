//! # Data Model
//!
//! Types exchanged between the generation pipeline, the AI collaborators and
//! the compositing engine. Field names serialize in camelCase to match the
//! JSON shapes the collaborators produce.
//!
//! ```text
//! CaptionRequest ─plan→ GenerationPlan ─synthesize→ background bytes
//!                                   └──analyze──→ PlacementDirective
//! (background, PlacementDirective) ─compose→ CompositionResult
//! ```

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{AdhyatmikError, Result};

/// Aspect ratios offered to the user.
///
/// The ratio is only a hint for background synthesis; the canvas always takes
/// its proportions from the bitmap that synthesis actually returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Story,
    #[serde(rename = "16:9")]
    Landscape,
    #[default]
    #[serde(rename = "3:4")]
    Portrait,
}

impl AspectRatio {
    /// All ratios, in display order.
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Square,
        AspectRatio::Story,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Story => "9:16",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "3:4",
        }
    }

    /// Human-readable label shown next to the ratio.
    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "Square",
            AspectRatio::Story => "Story",
            AspectRatio::Landscape => "Landscape",
            AspectRatio::Portrait => "Portrait",
        }
    }

    /// Nominal width:height pair.
    pub fn nominal(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1, 1),
            AspectRatio::Story => (9, 16),
            AspectRatio::Landscape => (16, 9),
            AspectRatio::Portrait => (3, 4),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AdhyatmikError;

    fn from_str(s: &str) -> Result<Self> {
        AspectRatio::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| {
                AdhyatmikError::Validation(format!(
                    "Unknown aspect ratio '{}' (expected one of 1:1, 9:16, 16:9, 3:4)",
                    s
                ))
            })
    }
}

/// A user's request: caption text plus the desired aspect ratio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRequest {
    pub caption: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
}

impl CaptionRequest {
    pub fn new(caption: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            caption: caption.into(),
            aspect_ratio,
        }
    }

    /// Reject empty (or whitespace-only) captions.
    pub fn validate(&self) -> Result<()> {
        if self.caption.trim().is_empty() {
            return Err(AdhyatmikError::Validation("caption is empty".to_string()));
        }
        Ok(())
    }
}

/// Output of the planning stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPlan {
    /// Prompt that drives background synthesis.
    pub image_prompt: String,
    /// The caption actually rendered (possibly normalized by the planner).
    pub hindi_text: String,
    /// Mood/theme passed on to placement analysis.
    pub theme: String,
}

/// Typeface style requested by placement analysis.
///
/// Unrecognized names deserialize to [`FontStyle::BoldSansSerif`], since
/// analysis output is not schema-validated upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    BoldSansSerif,
    ElegantSerif,
    Calligraphic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 3] = [
        FontStyle::BoldSansSerif,
        FontStyle::ElegantSerif,
        FontStyle::Calligraphic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::BoldSansSerif => "bold-sans-serif",
            FontStyle::ElegantSerif => "elegant-serif",
            FontStyle::Calligraphic => "calligraphic",
        }
    }

    /// Lenient lookup: anything unknown falls back to bold sans-serif.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "elegant-serif" => FontStyle::ElegantSerif,
            "calligraphic" => FontStyle::Calligraphic,
            _ => FontStyle::BoldSansSerif,
        }
    }
}

impl Serialize for FontStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FontStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(FontStyle::from_name(&name))
    }
}

fn default_shadow_color() -> String {
    "#000000".to_string()
}

/// Layout and style parameters produced by placement analysis.
///
/// `x`/`y` locate the center of the text block as percentages of the canvas
/// width/height. `font_size` is a percentage of the canvas width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementDirective {
    pub hindi_text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default = "default_shadow_color")]
    pub shadow_color: String,
    #[serde(default)]
    pub shadow_blur: f32,
}

impl PlacementDirective {
    /// Clamp numeric fields into their documented ranges.
    ///
    /// Non-finite values fall back to the center of the canvas (position),
    /// 10% (size) or no blur.
    pub fn normalized(mut self) -> Self {
        fn clamp_or(v: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
            if v.is_finite() { v.clamp(lo, hi) } else { fallback }
        }
        self.x = clamp_or(self.x, 0.0, 100.0, 50.0);
        self.y = clamp_or(self.y, 0.0, 100.0, 50.0);
        self.font_size = clamp_or(self.font_size, f32::MIN_POSITIVE, 100.0, 10.0);
        self.shadow_blur = clamp_or(self.shadow_blur, 0.0, 1000.0, 0.0);
        if self.text_color.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.text_color = None;
        }
        self
    }
}

/// The finished, encoded image.
#[derive(Clone, PartialEq, Eq)]
pub struct CompositionResult {
    /// JPEG-encoded bytes.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CompositionResult {
    pub const MIME: &'static str = "image/jpeg";
    pub const DOWNLOAD_NAME: &'static str = "adhyatmik_image.jpg";

    pub fn mime(&self) -> &'static str {
        Self::MIME
    }

    /// Encode as a `data:` URL for previewing in a browser.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            Self::MIME,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

impl fmt::Debug for CompositionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionResult")
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
