//! Bounds and fit-parameter computation
//!
//! A single pass over a decoded point cloud yields per-axis and per-color-
//! channel min/max bounds, from which a uniform scale and per-axis offset
//! are derived that map the cloud into the [-1, 1] display cube.

use crate::point::{Point3d, PointRecord, Vector3d};
use crate::point_cloud::PointCloud;
use serde::{Deserialize, Serialize};

/// A spatial axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// The coordinate of `point` along this axis
    pub fn value(&self, point: &PointRecord) -> f64 {
        match self {
            Axis::X => point.position.x,
            Axis::Y => point.position.y,
            Axis::Z => point.position.z,
        }
    }
}

/// Min/max bounds of a single scalar dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    fn seed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        self.min + self.size() / 2.0
    }

    /// Map `value` into [0, 1] over this range
    ///
    /// Degenerate ranges (`max <= min`) have gain 0: every value maps to 0,
    /// never NaN.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max <= self.min {
            0.0
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }
}

/// Bounds of a point cloud: three spatial axes and three color channels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: AxisBounds,
    pub y: AxisBounds,
    pub z: AxisBounds,
    pub r: AxisBounds,
    pub g: AxisBounds,
    pub b: AxisBounds,
}

impl Bounds {
    /// Compute bounds in one linear pass; `None` for an empty cloud
    pub fn from_cloud(cloud: &PointCloud) -> Option<Self> {
        let first = cloud.points.first()?;
        let mut bounds = Self {
            x: AxisBounds::seed(first.position.x),
            y: AxisBounds::seed(first.position.y),
            z: AxisBounds::seed(first.position.z),
            r: AxisBounds::seed(first.color.r as f64),
            g: AxisBounds::seed(first.color.g as f64),
            b: AxisBounds::seed(first.color.b as f64),
        };
        for point in cloud.iter().skip(1) {
            bounds.x.include(point.position.x);
            bounds.y.include(point.position.y);
            bounds.z.include(point.position.z);
            bounds.r.include(point.color.r as f64);
            bounds.g.include(point.color.g as f64);
            bounds.b.include(point.color.b as f64);
        }
        Some(bounds)
    }

    /// Spatial bounds for the given axis
    pub fn axis(&self, axis: Axis) -> AxisBounds {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// The normalization transform derived from a point cloud
///
/// The render pipeline applies `display = (raw + offset) * scale` per point.
/// `scale` and `offset` are plain fields so the viewer can override them
/// interactively without re-deriving from the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    pub scale: f64,
    pub offset: Vector3d,
    pub bounds: Bounds,
}

impl FitParams {
    /// Derive fit parameters from a cloud; `None` for an empty cloud
    pub fn from_cloud(cloud: &PointCloud) -> Option<Self> {
        Bounds::from_cloud(cloud).map(Self::from_bounds)
    }

    /// Derive fit parameters from precomputed bounds
    ///
    /// The cloud is centered at the origin and uniformly scaled so its
    /// largest extent spans [-1, 1]. A fully degenerate cloud (a single
    /// point) gets scale 0 rather than a division by zero.
    pub fn from_bounds(bounds: Bounds) -> Self {
        let max_size = bounds.x.size().max(bounds.y.size()).max(bounds.z.size());
        let scale = if max_size > 0.0 { 2.0 / max_size } else { 0.0 };
        let offset = Vector3d::new(
            -bounds.x.center(),
            -bounds.y.center(),
            -bounds.z.center(),
        );
        Self {
            scale,
            offset,
            bounds,
        }
    }

    /// Apply the transform: `(raw + offset) * scale`
    pub fn apply(&self, raw: Point3d) -> Point3d {
        Point3d::from((raw.coords + self.offset) * self.scale)
    }
}
