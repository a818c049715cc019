//! Drawing surface and rasterization.
//!
//! A [`Canvas`] lives for exactly one composition. Layering order:
//!
//! 1. background, scaled to fill the canvas
//! 2. per line: shadow (coverage mask shifted by [`SHADOW_OFFSET`], blurred, tinted)
//! 3. per line: glyph fill
//! 4. JPEG encode

use ab_glyph::{Font, point};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgba, RgbaImage, imageops};

use super::font::ScaledFont;
use crate::error::{AdhyatmikError, Result};

/// Shadow offset in pixels, applied on both axes.
pub const SHADOW_OFFSET: i64 = 2;

/// Largest surface we agree to allocate (about 64 megapixels).
const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Drop shadow behind text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba<u8>,
    /// Canvas-style blur amount; the Gaussian sigma is half of it.
    pub blur: f32,
}

impl Shadow {
    pub fn is_visible(&self) -> bool {
        self.color[3] > 0
    }

    fn sigma(&self) -> f32 {
        (self.blur / 2.0).max(0.0)
    }
}

/// Mutable RGBA drawing target for a single composition.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Acquire an opaque black surface of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AdhyatmikError::Surface(format!(
                "cannot create a {}x{} canvas",
                width, height
            )));
        }
        if width as u64 * height as u64 > MAX_PIXELS {
            return Err(AdhyatmikError::Surface(format!(
                "canvas {}x{} exceeds the pixel limit",
                width, height
            )));
        }
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Draw `background` stretched to exactly cover the canvas.
    pub fn draw_background(&mut self, background: &DynamicImage) {
        let resized = background
            .resize_exact(self.width(), self.height(), imageops::FilterType::Triangle)
            .to_rgba8();
        imageops::overlay(&mut self.image, &resized, 0, 0);
    }

    /// Draw one line of text centered on `(center_x, center_y)`, shadow first.
    pub fn fill_text(
        &mut self,
        text: &str,
        center_x: f32,
        center_y: f32,
        font: &ScaledFont,
        fill: Rgba<u8>,
        shadow: &Shadow,
    ) {
        if text.trim().is_empty() {
            return;
        }

        let (glyphs, width) = font.layout_glyphs(text);
        let ascent = font.ascent();
        let descent = font.descent();

        // Middle baseline: the em box is centered on center_y.
        let baseline = center_y + (ascent + descent) / 2.0;
        let left = center_x - width / 2.0;

        let pad = if shadow.is_visible() {
            (shadow.sigma() * 3.0).ceil() as i64 + 2
        } else {
            2
        };

        // Only rasterize the part of the line that can reach the canvas,
        // directly or through the offset, blurred shadow.
        let reach = pad + SHADOW_OFFSET;
        let full_x = left.floor() as i64 - pad;
        let full_y = (baseline - ascent).floor() as i64 - pad;
        let Some((origin_x, end_x)) = clip_span(
            full_x,
            full_x + width.ceil() as i64 + 2 * pad + 1,
            self.width() as i64,
            reach,
        ) else {
            return;
        };
        let Some((origin_y, end_y)) = clip_span(
            full_y,
            full_y + (ascent - descent).ceil() as i64 + 2 * pad + 1,
            self.height() as i64,
            reach,
        ) else {
            return;
        };
        let mask_w = (end_x - origin_x) as u32;
        let mask_h = (end_y - origin_y) as u32;

        // Glyph outlines stay within a couple of ems of their origin.
        let margin = font.px() * 2.0;
        let mut mask = GrayImage::new(mask_w, mask_h);
        for (glyph_id, glyph_x) in glyphs {
            let local_x = left + glyph_x - origin_x as f32;
            if local_x + margin < 0.0 {
                continue;
            }
            if local_x - margin > mask_w as f32 {
                break;
            }
            let glyph = glyph_id.with_scale_and_position(
                font.scale(),
                point(local_x, baseline - origin_y as f32),
            );
            if let Some(outlined) = font.font().outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    let x = px as i64 + bounds.min.x as i64;
                    let y = py as i64 + bounds.min.y as i64;
                    if x >= 0 && y >= 0 && (x as u32) < mask_w && (y as u32) < mask_h {
                        let pixel = mask.get_pixel_mut(x as u32, y as u32);
                        let value = pixel[0] as f32 + coverage * 255.0;
                        pixel[0] = value.min(255.0) as u8;
                    }
                });
            }
        }

        if shadow.is_visible() {
            let shadow_mask = if shadow.sigma() > 0.0 {
                imageops::blur(&mask, shadow.sigma())
            } else {
                mask.clone()
            };
            self.blend_mask(
                &shadow_mask,
                origin_x + SHADOW_OFFSET,
                origin_y + SHADOW_OFFSET,
                shadow.color,
            );
        }
        self.blend_mask(&mask, origin_x, origin_y, fill);
    }

    /// Source-over composite `color` through a coverage mask placed at `(ox, oy)`.
    fn blend_mask(&mut self, mask: &ImageBuffer<Luma<u8>, Vec<u8>>, ox: i64, oy: i64, color: Rgba<u8>) {
        let (cw, ch) = (self.width() as i64, self.height() as i64);
        let color_alpha = color[3] as f32 / 255.0;

        for (mx, my, coverage) in mask.enumerate_pixels() {
            if coverage[0] == 0 {
                continue;
            }
            let x = ox + mx as i64;
            let y = oy + my as i64;
            if x < 0 || y < 0 || x >= cw || y >= ch {
                continue;
            }
            let alpha = color_alpha * coverage[0] as f32 / 255.0;
            let dst = self.image.get_pixel_mut(x as u32, y as u32);
            for c in 0..3 {
                let blended = dst[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
                dst[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
            dst[3] = 255;
        }
    }

    /// Encode the surface as JPEG, consuming it.
    pub fn encode_jpeg(self, quality: u8) -> Result<Vec<u8>> {
        let rgb = DynamicImage::ImageRgba8(self.image).to_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| AdhyatmikError::Surface(format!("JPEG encoding failed: {}", e)))?;
        Ok(bytes)
    }
}

/// Intersect `[start, end)` with `[-reach, limit + reach)`.
fn clip_span(start: i64, end: i64, limit: i64, reach: i64) -> Option<(i64, i64)> {
    let lo = start.max(-reach);
    let hi = end.min(limit + reach);
    (hi > lo).then_some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::font::FontBook;
    use crate::model::FontStyle;

    fn bundled_font(px: f32) -> ScaledFont {
        let face = FontBook::bundled().resolve(FontStyle::BoldSansSerif).unwrap();
        ScaledFont::new(face, px)
    }

    fn no_shadow() -> Shadow {
        Shadow {
            color: Rgba([0, 0, 0, 0]),
            blur: 0.0,
        }
    }

    #[test]
    fn test_zero_sized_canvas_is_surface_error() {
        assert!(matches!(Canvas::new(0, 10), Err(AdhyatmikError::Surface(_))));
        assert!(matches!(Canvas::new(10, 0), Err(AdhyatmikError::Surface(_))));
        assert!(Canvas::new(1_000_000, 1_000_000).is_err());
    }

    #[test]
    fn test_background_fills_canvas() {
        let bg = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 20, Rgba([200, 10, 10, 255])));
        let mut canvas = Canvas::new(20, 10).unwrap();
        canvas.draw_background(&bg);
        assert_eq!(canvas.image().get_pixel(0, 0), &Rgba([200, 10, 10, 255]));
        assert_eq!(canvas.image().get_pixel(19, 9), &Rgba([200, 10, 10, 255]));
    }

    #[test]
    fn test_text_is_drawn_near_center() {
        let font = bundled_font(40.0);
        let mut canvas = Canvas::new(200, 100).unwrap();
        canvas.fill_text("HI", 100.0, 50.0, &font, Rgba([255, 255, 255, 255]), &no_shadow());

        let lit: Vec<(u32, u32)> = canvas
            .image()
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 128)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        let mean_x = lit.iter().map(|(x, _)| *x as f32).sum::<f32>() / lit.len() as f32;
        let mean_y = lit.iter().map(|(_, y)| *y as f32).sum::<f32>() / lit.len() as f32;
        assert!((mean_x - 100.0).abs() < 10.0, "mean_x = {}", mean_x);
        assert!((mean_y - 50.0).abs() < 15.0, "mean_y = {}", mean_y);
    }

    #[test]
    fn test_shadow_darkens_offset_pixels() {
        let font = bundled_font(40.0);
        let grey = Rgba([128, 128, 128, 255]);
        let shadow = Shadow {
            color: Rgba([0, 0, 0, 255]),
            blur: 0.0,
        };
        let mut plain = Canvas::new(200, 100).unwrap();
        plain.image = RgbaImage::from_pixel(200, 100, grey);
        plain.fill_text("I", 100.0, 50.0, &font, Rgba([255, 255, 255, 255]), &no_shadow());

        let mut shadowed = Canvas::new(200, 100).unwrap();
        shadowed.image = RgbaImage::from_pixel(200, 100, grey);
        shadowed.fill_text("I", 100.0, 50.0, &font, Rgba([255, 255, 255, 255]), &shadow);

        let darker = shadowed
            .image()
            .pixels()
            .filter(|p| p[0] < 100)
            .count();
        assert!(darker > 0);
        assert_eq!(plain.image().pixels().filter(|p| p[0] < 100).count(), 0);
    }

    #[test]
    fn test_blank_line_draws_nothing() {
        let font = bundled_font(40.0);
        let mut canvas = Canvas::new(50, 50).unwrap();
        canvas.fill_text("   ", 25.0, 25.0, &font, Rgba([255, 255, 255, 255]), &no_shadow());
        assert!(canvas.image().pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_encode_jpeg_magic() {
        let canvas = Canvas::new(16, 16).unwrap();
        let bytes = canvas.encode_jpeg(90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_clip_span() {
        assert_eq!(clip_span(10, 50, 100, 4), Some((10, 50)));
        assert_eq!(clip_span(-500_000, 500_000, 1080, 8), Some((-8, 1088)));
        assert_eq!(clip_span(2000, 2100, 1080, 8), None);
        assert_eq!(clip_span(-300, -9, 1080, 8), None);
    }

    #[test]
    fn test_overflowing_line_draws_visible_part() {
        let font = bundled_font(40.0);
        let shadow = Shadow {
            color: Rgba([0, 0, 0, 200]),
            blur: 8.0,
        };
        let line = "W".repeat(20_000);
        let mut canvas = Canvas::new(200, 100).unwrap();
        canvas.fill_text(&line, 100.0, 50.0, &font, Rgba([255, 255, 255, 255]), &shadow);

        // The line is far wider than the canvas, so lit pixels reach both edges.
        let lit_in = |xs: std::ops::Range<u32>| {
            xs.flat_map(|x| (0..100).map(move |y| (x, y)))
                .any(|(x, y)| canvas.image().get_pixel(x, y)[0] > 128)
        };
        assert!(lit_in(0..20));
        assert!(lit_in(180..200));
    }

    #[test]
    fn test_offscreen_line_draws_nothing() {
        let font = bundled_font(40.0);
        let mut canvas = Canvas::new(100, 100).unwrap();
        canvas.fill_text("HELLO", 5000.0, 50.0, &font, Rgba([255, 255, 255, 255]), &no_shadow());
        assert!(canvas.image().pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }
}
