//! I/O operations for pcview
//!
//! This crate turns raw PLY bytes into decoded point clouds: a bounded
//! textual header parse, a header-driven record decoder, and a synthetic
//! data generator for running without an input file. Reading the file into
//! memory is the only operation that touches the filesystem.

pub mod ply;
pub mod synthetic;

pub use ply::{decode_point_cloud, parse_header, PlyFormat, PlyHeader};
pub use synthetic::sinc_cloud;

use pcview_core::{PointCloud, Result};
use std::path::Path;
use tracing::{debug, info};

/// Read a file fully into memory
///
/// The file-I/O collaborator: decoding itself never blocks on I/O.
pub fn load_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path.as_ref())?;
    debug!("read {} bytes from {}", bytes.len(), path.as_ref().display());
    Ok(bytes)
}

/// Load, parse and decode a PLY file in one step
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<(PlyHeader, PointCloud)> {
    let bytes = load_bytes(&path)?;
    let (header, offset) = parse_header(&bytes)?;
    let cloud = decode_point_cloud(&header, &bytes[offset..])?;
    info!(
        "decoded {} points ({}, color: {}) from {}",
        cloud.len(),
        header.format,
        cloud.has_color,
        path.as_ref().display()
    );
    Ok((header, cloud))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn read_point_cloud_from_disk() {
        let path = temp_path("pcview_io_roundtrip.ply");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"ply\nformat binary_little_endian 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n")
            .unwrap();
        for v in [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0] {
            file.write_all(&v.to_le_bytes()).unwrap();
        }
        drop(file);

        let (header, cloud) = read_point_cloud(&path).unwrap();
        assert_eq!(header.format, PlyFormat::BinaryLittleEndian);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud[1].position.x, 4.0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_point_cloud("definitely/not/here.ply").unwrap_err();
        assert!(matches!(err, pcview_core::Error::Io(_)));
    }
}
