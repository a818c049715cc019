//! Font selection and text measurement.
//!
//! Each [`FontStyle`] maps to a [`FontSpec`] (generic family, weight and a
//! list of preferred face names). A [`FontBook`] resolves specs against a
//! `fontdb` database of system fonts (plus an optional extra directory) and
//! loads the chosen face with ab_glyph.
//!
//! DejaVu Sans Bold is compiled in and always present in the database, so
//! every style resolves to some face even on a host without fonts.

use ab_glyph::{Font, FontArc, FontVec, GlyphId, PxScale, ScaleFont};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{AdhyatmikError, Result};
use crate::model::FontStyle;

/// Generic CSS font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericFamily {
    SansSerif,
    Serif,
    Cursive,
}

impl GenericFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenericFamily::SansSerif => "sans-serif",
            GenericFamily::Serif => "serif",
            GenericFamily::Cursive => "cursive",
        }
    }

    fn to_fontdb(self) -> fontdb::Family<'static> {
        match self {
            GenericFamily::SansSerif => fontdb::Family::SansSerif,
            GenericFamily::Serif => fontdb::Family::Serif,
            GenericFamily::Cursive => fontdb::Family::Cursive,
        }
    }
}

/// Family and weight used to draw one font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSpec {
    pub family: GenericFamily,
    pub weight: u16,
    /// Named faces tried before the generic family, in order.
    pub preferred: &'static [&'static str],
}

const SANS_FACES: &[&str] = &[
    "Noto Sans Devanagari",
    "Segoe UI Emoji",
    "Noto Sans",
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
];

const SERIF_FACES: &[&str] = &[
    "Tiro Devanagari Hindi",
    "Noto Serif Devanagari",
    "Noto Serif",
    "DejaVu Serif",
    "Liberation Serif",
    "Times New Roman",
];

const CURSIVE_FACES: &[&str] = &["Kalam", "Comic Neue", "Comic Sans MS", "URW Chancery L"];

/// Style table. Adding a style means adding one row here.
const FONT_TABLE: &[(FontStyle, FontSpec)] = &[
    (
        FontStyle::BoldSansSerif,
        FontSpec {
            family: GenericFamily::SansSerif,
            weight: 700,
            preferred: SANS_FACES,
        },
    ),
    (
        FontStyle::ElegantSerif,
        FontSpec {
            family: GenericFamily::Serif,
            weight: 400,
            preferred: SERIF_FACES,
        },
    ),
    (
        FontStyle::Calligraphic,
        FontSpec {
            family: GenericFamily::Cursive,
            weight: 700,
            preferred: CURSIVE_FACES,
        },
    ),
];

impl FontSpec {
    /// Look up the spec for a style. Styles missing from the table use bold sans-serif.
    pub fn for_style(style: FontStyle) -> FontSpec {
        FONT_TABLE
            .iter()
            .find(|(s, _)| *s == style)
            .map(|(_, spec)| *spec)
            .unwrap_or(FONT_TABLE[0].1)
    }
}

/// Face registered in every [`FontBook::new`] database.
const BUNDLED_SANS: &[u8] = include_bytes!("fonts/DejaVuSans-Bold.ttf");

/// Resolves font styles to loaded faces.
pub struct FontBook {
    db: fontdb::Database,
    cache: Mutex<HashMap<FontStyle, FontArc>>,
}

impl FontBook {
    /// Build a font book from system fonts plus an optional extra directory.
    pub fn new(extra_dir: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_font_data(BUNDLED_SANS.to_vec());
        db.load_system_fonts();
        if let Some(dir) = extra_dir {
            db.load_fonts_dir(dir);
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self::from_database(db)
    }

    /// A font book holding only the compiled-in face. Renders identically on every host.
    pub fn bundled() -> Self {
        let mut db = fontdb::Database::new();
        db.load_font_data(BUNDLED_SANS.to_vec());
        Self::from_database(db)
    }

    /// Build a font book from an already populated database.
    pub fn from_database(db: fontdb::Database) -> Self {
        Self {
            db,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of faces known to the book.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Load the face for a style, caching it for later calls.
    pub fn resolve(&self, style: FontStyle) -> Result<FontArc> {
        if let Ok(cache) = self.cache.lock()
            && let Some(font) = cache.get(&style)
        {
            return Ok(font.clone());
        }

        let spec = FontSpec::for_style(style);
        let id = self.find_face(&spec).ok_or_else(|| {
            AdhyatmikError::Surface(format!(
                "no font face available for {} ({} faces loaded)",
                style.as_str(),
                self.db.len()
            ))
        })?;

        let font = self
            .db
            .with_face_data(id, |data, index| FontVec::try_from_vec_and_index(data.to_vec(), index))
            .ok_or_else(|| AdhyatmikError::Surface("font face data unavailable".to_string()))?
            .map_err(|e| AdhyatmikError::Surface(format!("invalid font face: {}", e)))?;
        let font = FontArc::new(font);

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(style, font.clone());
        }
        Ok(font)
    }

    /// Name and weight of the face a style resolves to, for diagnostics.
    pub fn describe(&self, style: FontStyle) -> Option<String> {
        let spec = FontSpec::for_style(style);
        let id = self.find_face(&spec)?;
        let face = self.db.face(id)?;
        let family = face
            .families
            .first()
            .map(|(name, _)| name.as_str())
            .unwrap_or("?");
        Some(format!("{} (weight {})", family, face.weight.0))
    }

    fn find_face(&self, spec: &FontSpec) -> Option<fontdb::ID> {
        let mut families: Vec<fontdb::Family<'_>> =
            spec.preferred.iter().map(|name| fontdb::Family::Name(name)).collect();
        families.push(spec.family.to_fontdb());

        let query = |families: &[fontdb::Family<'_>]| {
            self.db.query(&fontdb::Query {
                families,
                weight: fontdb::Weight(spec.weight),
                ..Default::default()
            })
        };

        query(&families)
            .or_else(|| {
                let mut fallback: Vec<fontdb::Family<'_>> =
                    SANS_FACES.iter().map(|name| fontdb::Family::Name(name)).collect();
                fallback.push(fontdb::Family::SansSerif);
                query(&fallback)
            })
            .or_else(|| self.db.faces().next().map(|face| face.id))
    }
}

/// Anything that can report the rendered width of a string.
pub trait TextMeasure {
    /// Advance width of `text` in pixels.
    fn measure(&self, text: &str) -> f32;
}

/// A face at a concrete CSS pixel size (em height).
#[derive(Clone)]
pub struct ScaledFont {
    font: FontArc,
    px: f32,
    scale: PxScale,
}

impl ScaledFont {
    pub fn new(font: FontArc, px: f32) -> Self {
        // ab_glyph scales by ascent-descent height; CSS sizes are em-based.
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let scale = PxScale::from(px * font.height_unscaled() / units_per_em);
        Self { font, px, scale }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Requested CSS pixel size.
    pub fn px(&self) -> f32 {
        self.px
    }

    pub fn scale(&self) -> PxScale {
        self.scale
    }

    pub fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }

    /// Descent (negative below the baseline).
    pub fn descent(&self) -> f32 {
        self.font.as_scaled(self.scale).descent()
    }

    /// Glyph ids with their x offsets from the line start, kerning applied.
    pub fn layout_glyphs(&self, text: &str) -> (Vec<(GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(self.scale);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret_x = 0.0f32;
        let mut previous: Option<GlyphId> = None;

        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let glyph_id = self.font.glyph_id(ch);
            if let Some(prev) = previous {
                caret_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push((glyph_id, caret_x));
            caret_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }

        (glyphs, caret_x)
    }
}

impl TextMeasure for ScaledFont {
    fn measure(&self, text: &str) -> f32 {
        self.layout_glyphs(text).1
    }
}
