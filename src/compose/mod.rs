//! # Caption Compositing Engine
//!
//! Turns a background bitmap plus a [`PlacementDirective`] into a finished
//! JPEG. Pure: no network, no AI, no suspension points.
//!
//! ## Pipeline
//!
//! ```text
//! background ──► canvas_size() ──► Canvas::new()
//!                                     │
//! directive ──► font_pixel_size() ──► FontBook::resolve() ──► layout_block()
//!                                     │
//!                 draw_background ──► fill_text (shadow, fill) ──► encode_jpeg
//! ```
//!
//! ## Sizing rules
//!
//! | Quantity | Rule |
//! |----------|------|
//! | canvas width | `min(bg_width, 1080)` |
//! | canvas height | `width / (bg_width / bg_height)` |
//! | font px | `max(24, width × font_size / 100)` |
//! | max line width | `0.9 × width` |

pub mod color;
pub mod font;
pub mod layout;
pub mod render;

use image::DynamicImage;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::EngineConfig;
use crate::error::{AdhyatmikError, Result};
use crate::model::{CompositionResult, PlacementDirective};

use font::{FontBook, ScaledFont};
use render::{Canvas, Shadow};

/// Smallest font size ever drawn, in pixels.
pub const MIN_FONT_PX: f32 = 24.0;

/// Canvas dimensions for a background, preserving its aspect ratio.
pub fn canvas_size(bg_width: u32, bg_height: u32, max_width: u32) -> Result<(u32, u32)> {
    if bg_width == 0 || bg_height == 0 {
        return Err(AdhyatmikError::Asset(format!(
            "background has no pixels ({}x{})",
            bg_width, bg_height
        )));
    }
    let width = bg_width.min(max_width.max(1));
    let aspect = bg_width as f64 / bg_height as f64;
    let height = (width as f64 / aspect).round().max(1.0) as u32;
    Ok((width, height))
}

/// Absolute font size for a directive's percentage size.
pub fn font_pixel_size(canvas_width: u32, font_size_percent: f32) -> f32 {
    (canvas_width as f32 * font_size_percent / 100.0).max(MIN_FONT_PX)
}

/// The compositing engine: fonts plus engine settings.
pub struct Compositor {
    fonts: FontBook,
    config: EngineConfig,
    /// Canvases created so far.
    surfaces: AtomicU64,
}

impl Compositor {
    pub fn new(config: EngineConfig) -> Self {
        let fonts = FontBook::new(config.font_dir.as_deref());
        Self::with_fonts(fonts, config)
    }

    pub fn with_fonts(fonts: FontBook, config: EngineConfig) -> Self {
        Self {
            fonts,
            config,
            surfaces: AtomicU64::new(0),
        }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of drawing surfaces this compositor has acquired.
    pub fn surfaces_acquired(&self) -> u64 {
        self.surfaces.load(Ordering::Relaxed)
    }

    /// Composite the directive's caption over `background` and encode the result.
    pub fn compose(
        &self,
        background: &DynamicImage,
        directive: &PlacementDirective,
    ) -> Result<CompositionResult> {
        let directive = directive.clone().normalized();
        let (width, height) = canvas_size(
            background.width(),
            background.height(),
            self.config.max_canvas_width,
        )?;
        let font_px = font_pixel_size(width, directive.font_size);
        let font = ScaledFont::new(self.fonts.resolve(directive.font_style)?, font_px);

        let block = layout::layout_block(
            &directive.hindi_text,
            width,
            height,
            directive.x,
            directive.y,
            font_px,
            &font,
        );

        let mut canvas = Canvas::new(width, height)?;
        let surface = self.surfaces.fetch_add(1, Ordering::Relaxed) + 1;
        canvas.draw_background(background);

        let fill = color::fill_color(directive.text_color.as_deref());
        let shadow = Shadow {
            color: color::shadow_color(&directive.shadow_color),
            blur: directive.shadow_blur,
        };
        for (line, y) in block.lines.iter().zip(&block.line_ys) {
            canvas.fill_text(line, block.center_x, *y, &font, fill, &shadow);
        }

        tracing::debug!(
            surface,
            width,
            height,
            font_px,
            lines = block.lines.len(),
            style = directive.font_style.as_str(),
            "caption composited"
        );

        let bytes = canvas.encode_jpeg(self.config.jpeg_quality)?;
        Ok(CompositionResult {
            bytes,
            width,
            height,
        })
    }
}
