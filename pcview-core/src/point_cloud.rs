//! Point cloud container

use crate::point::PointRecord;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// An ordered sequence of decoded points
///
/// Insertion order equals file order. `has_color` records whether the source
/// schema declared per-vertex color properties; when it did not, every record
/// carries the opaque-white default and file-based coloring is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<PointRecord>,
    pub has_color: bool,
}

impl PointCloud {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            has_color: false,
        }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            has_color: false,
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<PointRecord>, has_color: bool) -> Self {
        Self { points, has_color }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: PointRecord) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, PointRecord> {
        self.points.iter()
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for PointCloud {
    type Output = PointRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl IntoIterator for PointCloud {
    type Item = PointRecord;
    type IntoIter = std::vec::IntoIter<PointRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a PointRecord;
    type IntoIter = std::slice::Iter<'a, PointRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
