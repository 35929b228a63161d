//! Hex color parsing and the HSL representation used by the hue filter.
//!
//! Stored colors are 6-hex-digit RGB strings, optionally prefixed with `#`.
//! Anything else degrades to a neutral HSL value rather than failing, so a
//! malformed color in the database or in a query parameter can never abort
//! a request.

/// A color in cylindrical hue/saturation/lightness form.
///
/// `hue` is in degrees `[0, 360)`, `saturation` and `lightness` in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    /// Fallback for unparseable input.
    pub const NEUTRAL: Hsl = Hsl {
        hue: 0.0,
        saturation: 0.0,
        lightness: 0.0,
    };
}

fn channel(hex_pair: &str) -> Option<f64> {
    u8::from_str_radix(hex_pair, 16).ok().map(|v| v as f64 / 255.0)
}

/// Convert a hex color string (e.g. `"#ff0000"`) to HSL.
///
/// A leading `#` is stripped if present; hex digit case does not matter.
/// Input that is not exactly 6 hex digits yields [`Hsl::NEUTRAL`].
pub fn hex_to_hsl(s: &str) -> Hsl {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return Hsl::NEUTRAL;
    }
    let (r, g, b) = match (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])) {
        (Some(r), Some(g), Some(b)) => (r, g, b),
        _ => return Hsl::NEUTRAL,
    };

    let max_val = r.max(g).max(b);
    let min_val = r.min(g).min(b);
    let lightness = (max_val + min_val) / 2.0;

    if max_val == min_val {
        return Hsl {
            hue: 0.0,
            saturation: 0.0,
            lightness,
        };
    }

    let d = max_val - min_val;
    let saturation = if lightness > 0.5 {
        d / (2.0 - max_val - min_val)
    } else {
        d / (max_val + min_val)
    };

    // Max channel checked in red, green, blue priority order.
    let mut hue = if max_val == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max_val == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    hue /= 6.0;

    Hsl {
        hue: hue * 360.0,
        saturation,
        lightness,
    }
}

/// Circular distance between two hues in degrees, bounded in `[0, 180]`.
pub fn hue_distance(h1: f64, h2: f64) -> f64 {
    let d = (h1 - h2).abs();
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Normalize a hex color to a single-`#`-prefixed form.
pub fn normalize_hex(s: &str) -> String {
    format!("#{}", s.trim_start_matches('#'))
}
