//! Synthetic test-data generation
//!
//! The classic sinc-surface grid shown by the viewer when no file is chosen.

use pcview_core::{Point3d, PointCloud, PointRecord, Rgba};
use std::f64::consts::PI;

/// Generate a `width` x `height` grid over [-1, 1) with `z = sin(d) / d`
///
/// Colors are a grayscale ramp of the height. Output is deterministic.
pub fn sinc_cloud(width: usize, height: usize) -> PointCloud {
    let mut points = Vec::with_capacity(width * height);
    let pitch = 2.0 / width as f64;
    let k = (PI * 3.0) * (PI * 3.0);
    for i in 0..height {
        for j in 0..width {
            let x = -1.0 + pitch * j as f64;
            let y = -1.0 + pitch * i as f64;
            let z = if x == 0.0 && y == 0.0 {
                1.0
            } else {
                let d = (k * x * x + k * y * y).sqrt();
                d.sin() / d
            };
            let shade = (z.clamp(0.0, 1.0) * 255.0) as u8;
            points.push(PointRecord::new(
                Point3d::new(x, y, z),
                Rgba::opaque(shade, shade, shade),
            ));
        }
    }
    PointCloud::from_points(points, true)
}
