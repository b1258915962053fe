//! Named palette tables
//!
//! The color-mapping pipeline treats the palette table as an opaque
//! collaborator: it hands over an id and a normalized scalar and gets a
//! color back. `BuiltinPalettes` is the default table, implemented as
//! multi-stop linear interpolation.

use pcview_core::Rgba;
use serde::{Deserialize, Serialize};

/// Identifier of a named palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteId {
    RainbowWide,
    Rainbow,
    Grayscale,
    Terrain,
}

impl PaletteId {
    pub const ALL: [PaletteId; 4] = [
        PaletteId::RainbowWide,
        PaletteId::Rainbow,
        PaletteId::Grayscale,
        PaletteId::Terrain,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PaletteId::RainbowWide => "RainbowWide",
            PaletteId::Rainbow => "Rainbow",
            PaletteId::Grayscale => "Grayscale",
            PaletteId::Terrain => "Terrain",
        }
    }
}

/// Palette lookup collaborator
pub trait PaletteTable {
    /// Resolve `t` in [0, 1] against the palette named by `id`
    fn resolve(&self, id: PaletteId, t: f64) -> Rgba;
}

/// The built-in palette set
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPalettes;

impl PaletteTable for BuiltinPalettes {
    fn resolve(&self, id: PaletteId, t: f64) -> Rgba {
        let stops: &[[f64; 3]] = match id {
            // Magenta through the full hue sweep to red
            PaletteId::RainbowWide => &[
                [1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
            ],
            PaletteId::Rainbow => &[
                [0.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
            ],
            PaletteId::Grayscale => &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
            // Low blue-gray to high white
            PaletteId::Terrain => &[
                [0.2, 0.4, 0.6],
                [0.3, 0.5, 0.2],
                [0.6, 0.6, 0.3],
                [0.5, 0.4, 0.3],
                [0.9, 0.9, 0.9],
            ],
        };
        lerp_stops(stops, t)
    }
}

/// Piecewise-linear interpolation over evenly spaced color stops
fn lerp_stops(stops: &[[f64; 3]], t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let last = stops.len() - 1;
    let scaled = t * last as f64;
    let i = (scaled.floor() as usize).min(last - 1);
    let frac = scaled - i as f64;
    let lo = stops[i];
    let hi = stops[i + 1];
    let channel = |a: f64, b: f64| ((a + (b - a) * frac) * 255.0).round() as u8;
    Rgba::opaque(
        channel(lo[0], hi[0]),
        channel(lo[1], hi[1]),
        channel(lo[2], hi[2]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_endpoints() {
        let palettes = BuiltinPalettes;
        assert_eq!(
            palettes.resolve(PaletteId::Grayscale, 0.0),
            Rgba::opaque(0, 0, 0)
        );
        assert_eq!(
            palettes.resolve(PaletteId::Grayscale, 1.0),
            Rgba::opaque(255, 255, 255)
        );
        assert_eq!(
            palettes.resolve(PaletteId::Grayscale, 0.5),
            Rgba::opaque(128, 128, 128)
        );
    }

    #[test]
    fn rainbow_midpoint_is_green() {
        let palettes = BuiltinPalettes;
        assert_eq!(
            palettes.resolve(PaletteId::Rainbow, 0.5),
            Rgba::opaque(0, 255, 0)
        );
    }

    #[test]
    fn out_of_range_input_clamps() {
        let palettes = BuiltinPalettes;
        assert_eq!(
            palettes.resolve(PaletteId::Rainbow, -3.0),
            palettes.resolve(PaletteId::Rainbow, 0.0)
        );
        assert_eq!(
            palettes.resolve(PaletteId::Rainbow, 42.0),
            palettes.resolve(PaletteId::Rainbow, 1.0)
        );
    }
}
