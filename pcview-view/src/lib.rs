//! Viewer-session state for pcview
//!
//! The live, reconfigurable half of the core: the three-mode color-mapping
//! pipeline, the palette table it indexes, and the session/document model
//! that owns the decoded point sequence and its fit parameters.

pub mod colormap;
pub mod document;
pub mod palette;
pub mod session;

pub use colormap::*;
pub use document::*;
pub use palette::*;
pub use session::*;
