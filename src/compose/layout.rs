//! Caption layout: word wrapping and vertical placement.
//!
//! ## Wrapping
//!
//! The caption is split on explicit line breaks first; each segment is then
//! filled greedily word by word against `max_width`. A word that overflows
//! starts a new line unless it is the first word on the line, so a single
//! word wider than `max_width` stays on its own (overflowing) line.
//!
//! ## Vertical placement
//!
//! ```text
//! spacing = 1.4 × font_px
//! total   = (lines − 1) × spacing
//! y[0]    = canvas_h × y% − total / 2
//! y[i]    = y[0] + i × spacing
//! ```
//!
//! The block is centered on the directive's `y`, not anchored by its first line.

use super::font::TextMeasure;

/// Line spacing as a multiple of the font pixel size.
pub const LINE_SPACING: f32 = 1.4;

/// Fraction of the canvas width available to a line.
pub const MAX_WIDTH_RATIO: f32 = 0.9;

/// Wrapped and positioned caption lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    /// Horizontal center of every line, in pixels.
    pub center_x: f32,
    /// Vertical center of each line, in pixels.
    pub line_ys: Vec<f32>,
    pub font_px: f32,
}

/// Wrap a caption into lines no wider than `max_width` where possible.
pub fn wrap_caption(caption: &str, max_width: f32, measure: &impl TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();

    for segment in caption.split('\n') {
        let segment = segment.strip_suffix('\r').unwrap_or(segment);
        let mut current = String::new();

        for word in segment.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if !current.is_empty() && measure.measure(&candidate) > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }

        lines.push(current);
    }

    lines
}

/// Vertical centers for `line_count` lines centered on `y_percent` of the canvas.
pub fn line_positions(canvas_height: f32, y_percent: f32, line_count: usize, font_px: f32) -> Vec<f32> {
    let spacing = font_px * LINE_SPACING;
    let total = line_count.saturating_sub(1) as f32 * spacing;
    let start = canvas_height * y_percent / 100.0 - total / 2.0;
    (0..line_count).map(|i| start + i as f32 * spacing).collect()
}

/// Wrap and position a caption on a canvas.
pub fn layout_block(
    caption: &str,
    canvas_width: u32,
    canvas_height: u32,
    x_percent: f32,
    y_percent: f32,
    font_px: f32,
    measure: &impl TextMeasure,
) -> TextBlock {
    let max_width = canvas_width as f32 * MAX_WIDTH_RATIO;
    let lines = wrap_caption(caption, max_width, measure);
    let line_ys = line_positions(canvas_height as f32, y_percent, lines.len(), font_px);

    TextBlock {
        center_x: canvas_width as f32 * x_percent / 100.0,
        line_ys,
        lines,
        font_px,
    }
}
