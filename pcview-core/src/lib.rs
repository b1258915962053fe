//! Core data structures for pcview
//!
//! This crate provides the fundamental types shared by the pcview viewer
//! core: the decoded point representation, the point-cloud container, the
//! fit-parameter (normalize-to-display-volume) calculator, and the common
//! error type.

pub mod error;
pub mod fit;
pub mod point;
pub mod point_cloud;

pub use error::*;
pub use fit::*;
pub use point::*;
pub use point_cloud::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
