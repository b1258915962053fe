//! The three-mode color-mapping pipeline
//!
//! Converts a point's position/color into a final display color under one of
//! three modes: a single flat color, a palette mapped over a spatial axis, or
//! the color decoded from the file. The state is a plain value; every update
//! operation applies a change and returns the new state, which keeps the
//! pipeline unit-testable without a live UI.

use crate::palette::{PaletteId, PaletteTable};
use pcview_core::{Axis, Bounds, Error, PointRecord, Result, Rgba};
use serde::{Deserialize, Serialize};

/// Color source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// One flat color for every point
    Single,
    /// Palette indexed by a spatial axis over a configurable range
    Mapped,
    /// The per-point color decoded from the file
    FromFile,
}

/// What happens to points whose mapped value falls outside the range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnmappedPolicy {
    Clamp,
    Hide,
}

/// Live-reconfigurable color-mapping state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMapState {
    pub mode: ColorMode,
    pub axis: Axis,
    pub palette: PaletteId,
    pub repeat_count: u32,
    pub range_from: f64,
    pub range_to: f64,
    pub unmapped: UnmappedPolicy,
    pub single_color: Rgba,
}

impl Default for ColorMapState {
    fn default() -> Self {
        Self {
            mode: ColorMode::Single,
            axis: Axis::Z,
            palette: PaletteId::RainbowWide,
            repeat_count: 1,
            range_from: 0.0,
            range_to: 1.0,
            unmapped: UnmappedPolicy::Clamp,
            single_color: Rgba::WHITE,
        }
    }
}

impl ColorMapState {
    /// Switch modes; `FromFile` requires the active document to carry color
    /// data, otherwise the selection is a configuration error and the caller
    /// keeps the previous state.
    pub fn with_mode(self, mode: ColorMode, has_color: bool) -> Result<Self> {
        if mode == ColorMode::FromFile && !has_color {
            return Err(Error::Configuration(
                "file color mode selected but the document carries no color data".to_string(),
            ));
        }
        Ok(Self { mode, ..self })
    }

    /// Select the mapped axis, re-seeding the range from its bounds
    pub fn with_axis(self, axis: Axis, bounds: &Bounds) -> Self {
        let seed = bounds.axis(axis);
        Self {
            axis,
            range_from: seed.min,
            range_to: seed.max,
            ..self
        }
    }

    pub fn with_range(self, from: f64, to: f64) -> Self {
        Self {
            range_from: from,
            range_to: to,
            ..self
        }
    }

    /// Repeat counts below 1 are clamped to 1
    pub fn with_repeat_count(self, count: u32) -> Self {
        Self {
            repeat_count: count.max(1),
            ..self
        }
    }

    pub fn with_unmapped_policy(self, policy: UnmappedPolicy) -> Self {
        Self {
            unmapped: policy,
            ..self
        }
    }

    pub fn with_palette(self, palette: PaletteId) -> Self {
        Self { palette, ..self }
    }

    pub fn with_single_color(self, color: Rgba) -> Self {
        Self {
            single_color: color,
            ..self
        }
    }
}

/// Outcome of color resolution for one point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedColor {
    Visible(Rgba),
    /// The point is not to be rendered at all
    Hidden,
}

impl ResolvedColor {
    pub fn rgba(&self) -> Option<Rgba> {
        match self {
            ResolvedColor::Visible(color) => Some(*color),
            ResolvedColor::Hidden => None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, ResolvedColor::Hidden)
    }
}

/// Resolve the display color of one point under the current state
pub fn resolve_color(
    point: &PointRecord,
    state: &ColorMapState,
    palettes: &impl PaletteTable,
) -> ResolvedColor {
    match state.mode {
        ColorMode::Single => ResolvedColor::Visible(state.single_color),
        ColorMode::FromFile => ResolvedColor::Visible(point.color),
        ColorMode::Mapped => {
            let value = state.axis.value(point);
            let span = state.range_to - state.range_from;
            let mut t = if span > 0.0 {
                (value - state.range_from) / span
            } else {
                0.0
            };
            if !(0.0..=1.0).contains(&t) {
                match state.unmapped {
                    UnmappedPolicy::Clamp => t = t.clamp(0.0, 1.0),
                    UnmappedPolicy::Hide => return ResolvedColor::Hidden,
                }
            }
            ResolvedColor::Visible(palettes.resolve(state.palette, wrap(t, state.repeat_count)))
        }
    }
}

/// Repeat the palette `count` times across the range: `(t * count) mod 1`
///
/// An exact boundary reached from the left keeps the palette's end color
/// instead of snapping back to the first entry.
fn wrap(t: f64, count: u32) -> f64 {
    let scaled = t * count as f64;
    let wrapped = scaled.fract();
    if wrapped == 0.0 && scaled > 0.0 {
        1.0
    } else {
        wrapped
    }
}
