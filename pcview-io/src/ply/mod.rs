//! PLY point-cloud format support

pub mod decode;
pub mod header;

pub use decode::decode_point_cloud;
pub use header::{
    parse_header, Element, PlyFormat, PlyHeader, Property, PropertyKind, ScalarType,
    HEADER_SCAN_LIMIT,
};
