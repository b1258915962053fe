//! Point types and related functionality

use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// A fully opaque color from RGB channels
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// The canonical decoded point: position plus display color
///
/// Records are immutable once decoded; a loaded file is represented as an
/// ordered sequence of these in file order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub position: Point3d,
    pub color: Rgba,
}

impl PointRecord {
    pub fn new(position: Point3d, color: Rgba) -> Self {
        Self { position, color }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }
}

impl Default for PointRecord {
    fn default() -> Self {
        Self {
            position: Point3d::origin(),
            color: Rgba::WHITE,
        }
    }
}

/// A point in the packed layout the render pipeline uploads
///
/// f32 position followed by four color bytes, 16 bytes per vertex with no
/// padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct RenderVertex {
    pub position: [f32; 3],
    pub color: [u8; 4],
}

unsafe impl Pod for RenderVertex {}
unsafe impl Zeroable for RenderVertex {}

impl From<&PointRecord> for RenderVertex {
    fn from(point: &PointRecord) -> Self {
        Self {
            position: [
                point.position.x as f32,
                point.position.y as f32,
                point.position.z as f32,
            ],
            color: [point.color.r, point.color.g, point.color.b, point.color.a],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_point_is_white_at_origin() {
        let p = PointRecord::default();
        assert_eq!(p.position, Point3d::origin());
        assert_eq!(p.color, Rgba::WHITE);
    }

    #[test]
    fn render_vertex_packs_position_and_color() {
        let p = PointRecord::new(Point3d::new(1.0, -2.0, 0.5), Rgba::new(10, 20, 30, 40));
        let v = RenderVertex::from(&p);
        assert_eq!(v.position, [1.0, -2.0, 0.5]);
        assert_eq!(v.color, [10, 20, 30, 40]);
    }

    #[test]
    fn render_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<RenderVertex>(), 16);
        let v = RenderVertex {
            position: [0.0, 0.0, 1.0],
            color: [255, 0, 0, 255],
        };
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[12..], &[255, 0, 0, 255]);
    }
}
