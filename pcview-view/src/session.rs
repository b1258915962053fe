//! Viewer session state
//!
//! The session owns the active document and the color-mapping state. The
//! color state outlives document loads; only the availability of file-based
//! coloring is revalidated per document. A failed load leaves the previous
//! document fully intact.

use crate::colormap::{resolve_color, ColorMapState, ColorMode, ResolvedColor, UnmappedPolicy};
use crate::document::Document;
use crate::palette::{PaletteId, PaletteTable};
use pcview_core::{Axis, Error, PointRecord, Result, Rgba, Vector3d};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct Session {
    document: Option<Document>,
    colors: ColorMapState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn colors(&self) -> &ColorMapState {
        &self.colors
    }

    /// Load a PLY file, replacing the active document on success
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&Document> {
        let path = path.as_ref();
        let bytes = pcview_io::load_bytes(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.load_bytes(&name, &bytes)
    }

    /// Decode an in-memory PLY buffer, replacing the active document on
    /// success
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<&Document> {
        let document = Document::from_bytes(name, bytes)?;
        Ok(self.install(document))
    }

    /// Install a generated sinc-surface document
    pub fn load_synthetic(&mut self, width: usize, height: usize) -> Result<&Document> {
        let document = Document::synthetic(width, height)?;
        Ok(self.install(document))
    }

    fn install(&mut self, document: Document) -> &Document {
        if self.colors.mode == ColorMode::FromFile && !document.has_color() {
            warn!(
                "document '{}' carries no color data; falling back to single-color mode",
                document.name()
            );
            self.colors.mode = ColorMode::Single;
        }
        info!(
            "installed document '{}': {} points, {}",
            document.name(),
            document.point_count(),
            document.color_format()
        );
        self.document.insert(document)
    }

    /// Switch color modes; selecting `FromFile` without color data in the
    /// active document is rejected and the state stays unchanged
    pub fn set_color_mode(&mut self, mode: ColorMode) -> Result<()> {
        let has_color = self.document.as_ref().is_some_and(Document::has_color);
        self.colors = self.colors.with_mode(mode, has_color)?;
        Ok(())
    }

    /// Select the mapped axis; the range re-seeds from the active document's
    /// bounds for that axis
    pub fn set_axis(&mut self, axis: Axis) {
        match &self.document {
            Some(document) => self.colors = self.colors.with_axis(axis, document.bounds()),
            None => self.colors.axis = axis,
        }
    }

    pub fn set_range(&mut self, from: f64, to: f64) {
        self.colors = self.colors.with_range(from, to);
    }

    pub fn set_repeat_count(&mut self, count: u32) {
        self.colors = self.colors.with_repeat_count(count);
    }

    pub fn set_unmapped_policy(&mut self, policy: UnmappedPolicy) {
        self.colors = self.colors.with_unmapped_policy(policy);
    }

    pub fn set_palette(&mut self, palette: PaletteId) {
        self.colors = self.colors.with_palette(palette);
    }

    pub fn set_single_color(&mut self, color: Rgba) {
        self.colors = self.colors.with_single_color(color);
    }

    /// Restore the color-mapping defaults
    pub fn reset_colors(&mut self) {
        self.colors = ColorMapState::default();
    }

    /// Manually override the active document's offset/scale
    pub fn set_fit_override(&mut self, offset: Vector3d, scale: f64) -> Result<()> {
        let document = self
            .document
            .as_mut()
            .ok_or_else(|| Error::Configuration("no document loaded".to_string()))?;
        document.override_fit(offset, scale);
        Ok(())
    }

    /// Resolve one point's display color under the session state
    pub fn resolve_color(
        &self,
        point: &PointRecord,
        palettes: &impl PaletteTable,
    ) -> ResolvedColor {
        resolve_color(point, &self.colors, palettes)
    }
}
