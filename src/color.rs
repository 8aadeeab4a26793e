//! Fill colors and the tolerance predicate used by the flood fill.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Default per-channel tolerance for region matching. Tuned against
/// anti-aliased line art: high enough to absorb the soft edge of a black
/// outline, low enough not to leak through it.
pub const DEFAULT_TOLERANCE: u8 = 40;

/// Default cap on pixels visited by one fill call. A circuit breaker for
/// runaway fills on near-uniform pages, not a precise area limit.
pub const DEFAULT_FILL_BUDGET: usize = 1_000_000;

/// An opaque RGB paint color. Alpha is not stored — fills and strokes are
/// always rendered fully opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FillColor {
    /// Paintable white — also the "eraser" color over blank page regions.
    pub const WHITE: FillColor = FillColor::new(255, 255, 255);
    pub const BLACK: FillColor = FillColor::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The color as written into the raster: alpha forced to 255.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    /// Parse `#rrggbb` or `rrggbb` (case-insensitive). Used by the CLI and
    /// by hosts that hand colors through as hex strings.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl std::fmt::Display for FillColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Tolerance match on the first three channels: true iff every channel's
/// absolute difference is strictly less than `tolerance`. Alpha is ignored
/// so anti-aliased edge pixels compare by hue, not by coverage. Pure and
/// symmetric; the fill applies it identically in all four scan directions.
#[inline]
pub fn channels_match(a: Rgba<u8>, b: Rgba<u8>, tolerance: u8) -> bool {
    let t = tolerance as i16;
    (a.0[0] as i16 - b.0[0] as i16).abs() < t
        && (a.0[1] as i16 - b.0[1] as i16).abs() < t
        && (a.0[2] as i16 - b.0[2] as i16).abs() < t
}
