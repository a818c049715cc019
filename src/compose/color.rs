//! CSS color strings as produced by placement analysis.
//!
//! Parsing is tolerant: callers fall back to a default when a string is not
//! understood instead of rejecting the directive.

use image::Rgba;

const NAMED: &[(&str, [u8; 4])] = &[
    ("white", [255, 255, 255, 255]),
    ("black", [0, 0, 0, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("gold", [255, 215, 0, 255]),
    ("purple", [128, 0, 128, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("silver", [192, 192, 192, 255]),
    ("saffron", [244, 196, 48, 255]),
    ("transparent", [0, 0, 0, 0]),
];

/// Opaque white, used when the text color is absent or unreadable.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Fully transparent; a shadow in this color draws nothing.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` or a named color.
pub fn parse_css_color(color: &str) -> Option<Rgba<u8>> {
    let c = color.trim().to_ascii_lowercase();

    if let Some(hex) = c.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = c
        .strip_prefix("rgba(")
        .or_else(|| c.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == c)
        .map(|(_, rgba)| Rgba(*rgba))
}

/// Text fill color: the directive's color if readable, else white.
pub fn fill_color(text_color: Option<&str>) -> Rgba<u8> {
    text_color.and_then(parse_css_color).unwrap_or(WHITE)
}

/// Shadow color: unreadable strings disable the shadow.
pub fn shadow_color(shadow: &str) -> Rgba<u8> {
    parse_css_color(shadow).unwrap_or(TRANSPARENT)
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba<u8>> {
    let parts: Vec<&str> = args
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |p: &str| -> Option<u8> {
        let v = match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? * 2.55,
            None => p.parse::<f32>().ok()?,
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = |p: &str| -> Option<u8> {
        let v = match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => p.parse::<f32>().ok()?,
        };
        Some((v.clamp(0.0, 1.0) * 255.0).round() as u8)
    };

    let a = match parts.get(3) {
        Some(p) => alpha(p)?,
        None => 255,
    };
    Some(Rgba([channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, a]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_css_color("#000"), Some(Rgba([0, 0, 0, 255])));
        assert_eq!(parse_css_color("#FFD700"), Some(Rgba([255, 215, 0, 255])));
        assert_eq!(parse_css_color("#ffffff80"), Some(Rgba([255, 255, 255, 128])));
        assert_eq!(parse_css_color("#f008"), Some(Rgba([255, 0, 0, 136])));
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(parse_css_color("rgb(10, 20, 30)"), Some(Rgba([10, 20, 30, 255])));
        assert_eq!(
            parse_css_color("rgba(0,0,0,0.5)"),
            Some(Rgba([0, 0, 0, 128]))
        );
        assert_eq!(parse_css_color("rgb(0 0 0 / 50%)"), Some(Rgba([0, 0, 0, 128])));
    }

    #[test]
    fn test_named() {
        assert_eq!(parse_css_color(" White "), Some(WHITE));
        assert_eq!(parse_css_color("transparent"), Some(TRANSPARENT));
    }

    #[test]
    fn test_malformed_is_none() {
        assert_eq!(parse_css_color("#12"), None);
        assert_eq!(parse_css_color("#gggggg"), None);
        assert_eq!(parse_css_color("rgb(1,2)"), None);
        assert_eq!(parse_css_color("not-a-color"), None);
        assert_eq!(parse_css_color("#१२३"), None);
    }

    #[test]
    fn test_fill_defaults_to_white() {
        assert_eq!(fill_color(None), WHITE);
        assert_eq!(fill_color(Some("bogus")), WHITE);
        assert_eq!(fill_color(Some("#000")), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_bad_shadow_is_transparent() {
        assert_eq!(shadow_color("???"), TRANSPARENT);
        assert_eq!(shadow_color("black"), Rgba([0, 0, 0, 255]));
    }
}
