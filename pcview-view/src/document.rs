//! The loaded document
//!
//! A document bundles everything derived from one successful load: the
//! schema, the decoded point sequence and its fit parameters. It is built
//! completely before it becomes visible to anyone, which is what makes
//! re-loads atomic from the consumer's point of view.

use pcview_core::{Bounds, Error, FitParams, PointCloud, RenderVertex, Result, Vector3d};
use pcview_io::{decode_point_cloud, parse_header, sinc_cloud, PlyHeader};

#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    /// Absent for generated data
    header: Option<PlyHeader>,
    cloud: PointCloud,
    fit: FitParams,
}

impl Document {
    /// Parse, decode and fit a PLY buffer into a complete document
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let (header, offset) = parse_header(bytes)?;
        let cloud = decode_point_cloud(&header, &bytes[offset..])?;
        let fit = FitParams::from_cloud(&cloud)
            .ok_or_else(|| Error::InvalidData("vertex element is empty".to_string()))?;
        Ok(Self {
            name: name.to_string(),
            header: Some(header),
            cloud,
            fit,
        })
    }

    /// A generated sinc-surface document for running without an input file
    pub fn synthetic(width: usize, height: usize) -> Result<Self> {
        let cloud = sinc_cloud(width, height);
        let fit = FitParams::from_cloud(&cloud)
            .ok_or_else(|| Error::InvalidData("synthetic grid is empty".to_string()))?;
        Ok(Self {
            name: format!("generated {width}x{height}"),
            header: None,
            cloud,
            fit,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> Option<&PlyHeader> {
        self.header.as_ref()
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn fit(&self) -> &FitParams {
        &self.fit
    }

    pub fn bounds(&self) -> &Bounds {
        &self.fit.bounds
    }

    pub fn point_count(&self) -> usize {
        self.cloud.len()
    }

    pub fn has_color(&self) -> bool {
        self.cloud.has_color
    }

    /// Whether the source declared a face element (its values are dropped)
    pub fn has_faces(&self) -> bool {
        self.header
            .as_ref()
            .and_then(|h| h.find_element("face"))
            .is_some()
    }

    /// Human-readable description of the detected color layout
    pub fn color_format(&self) -> String {
        if !self.has_color() {
            return "no color data".to_string();
        }
        let Some(header) = &self.header else {
            return "generated grayscale".to_string();
        };
        match header.vertex_element() {
            Some((_, vertex)) => {
                let channels: Vec<&str> = ["red", "green", "blue", "alpha"]
                    .iter()
                    .copied()
                    .filter(|name| vertex.has_scalar(name))
                    .collect();
                let ty = vertex
                    .properties
                    .iter()
                    .find(|p| p.name == "red")
                    .and_then(|p| p.scalar_type())
                    .map(|ty| ty.name())
                    .unwrap_or("unknown");
                format!("{} {}", channels.join("/"), ty)
            }
            None => "no color data".to_string(),
        }
    }

    /// Replace the derived transform with a manual override
    ///
    /// Bounds stay untouched; only the applied offset/scale change.
    pub fn override_fit(&mut self, offset: Vector3d, scale: f64) {
        self.fit.offset = offset;
        self.fit.scale = scale;
    }

    /// The cloud in the packed layout the render pipeline uploads
    pub fn render_vertices(&self) -> Vec<RenderVertex> {
        self.cloud.iter().map(RenderVertex::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn colored_ply() -> Vec<u8> {
        let mut bytes = b"ply\nformat binary_little_endian 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n".to_vec();
        for v in [0.0f32, 0.0, 0.0] {
            bytes.extend(v.to_le_bytes());
        }
        bytes.extend([255, 0, 0]);
        for v in [2.0f32, 0.0, 0.0] {
            bytes.extend(v.to_le_bytes());
        }
        bytes.extend([0, 0, 255]);
        bytes
    }

    #[test]
    fn from_bytes_builds_a_complete_document() {
        let doc = Document::from_bytes("cube.ply", &colored_ply()).unwrap();
        assert_eq!(doc.name(), "cube.ply");
        assert_eq!(doc.point_count(), 2);
        assert!(doc.has_color());
        assert!(doc.has_faces());
        assert_eq!(doc.color_format(), "red/green/blue uint8");
        assert_relative_eq!(doc.fit().scale, 1.0); // x spans [0, 2]
    }

    #[test]
    fn uncolored_document_reports_no_color_data() {
        let mut bytes = b"ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n".to_vec();
        for v in [1.0f32, 2.0, 3.0] {
            bytes.extend(v.to_le_bytes());
        }
        let doc = Document::from_bytes("bare.ply", &bytes).unwrap();
        assert!(!doc.has_color());
        assert!(!doc.has_faces());
        assert_eq!(doc.color_format(), "no color data");
    }

    #[test]
    fn empty_vertex_element_is_invalid() {
        let bytes = b"ply\nformat binary_little_endian 1.0\nelement vertex 0\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
        let err = Document::from_bytes("empty.ply", bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn synthetic_document_is_colored_and_fitted() {
        let doc = Document::synthetic(8, 4).unwrap();
        assert_eq!(doc.point_count(), 32);
        assert!(doc.has_color());
        assert_eq!(doc.color_format(), "generated grayscale");
        assert!(doc.fit().scale > 0.0);
    }

    #[test]
    fn override_fit_keeps_bounds() {
        let mut doc = Document::from_bytes("cube.ply", &colored_ply()).unwrap();
        let bounds_before = *doc.bounds();
        doc.override_fit(Vector3d::new(1.0, 2.0, 3.0), 0.25);
        assert_eq!(doc.fit().scale, 0.25);
        assert_eq!(doc.fit().offset, Vector3d::new(1.0, 2.0, 3.0));
        assert_eq!(*doc.bounds(), bounds_before);
    }

    #[test]
    fn render_vertices_match_point_count() {
        let doc = Document::from_bytes("cube.ply", &colored_ply()).unwrap();
        let vertices = doc.render_vertices();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].color, [255, 0, 0, 255]);
        assert_eq!(vertices[1].position, [2.0, 0.0, 0.0]);
    }
}
