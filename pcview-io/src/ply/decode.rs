//! PLY record decoding and projection
//!
//! Walks the header's elements in declaration order, decodes the vertex
//! element's fixed-width records, and projects them into `PointRecord`s by
//! property name. Elements before the vertex element are skipped by computed
//! width; elements after it are ignored entirely, which is how a trailing
//! `face` element with a list property is tolerated.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use pcview_core::{Error, Point3d, PointCloud, PointRecord, Result, Rgba};

use super::header::{Element, PlyFormat, PlyHeader, ScalarType};

/// Location of one scalar field within a record
///
/// `position` is a byte offset for binary payloads and a token index for
/// ASCII payloads.
#[derive(Debug, Clone, Copy)]
struct Field {
    position: usize,
    ty: ScalarType,
}

/// Name-resolved projection of a vertex element's properties
#[derive(Debug)]
struct VertexLayout {
    x: Field,
    y: Field,
    z: Field,
    red: Option<Field>,
    green: Option<Field>,
    blue: Option<Field>,
    alpha: Option<Field>,
}

impl VertexLayout {
    fn resolve(element: &Element, ascii: bool) -> Result<Self> {
        let mut x = None;
        let mut y = None;
        let mut z = None;
        let mut red = None;
        let mut green = None;
        let mut blue = None;
        let mut alpha = None;

        let mut position = 0usize;
        for (index, property) in element.properties.iter().enumerate() {
            let ty = property.scalar_type().ok_or_else(|| {
                Error::UnsupportedProperty(format!(
                    "list property '{}' on element '{}'",
                    property.name, element.name
                ))
            })?;
            let field = Field {
                position: if ascii { index } else { position },
                ty,
            };
            match property.name.as_str() {
                "x" => x = Some(field),
                "y" => y = Some(field),
                "z" => z = Some(field),
                "red" => red = Some(field),
                "green" => green = Some(field),
                "blue" => blue = Some(field),
                "alpha" => alpha = Some(field),
                _ => {}
            }
            position += ty.width();
        }

        let missing = || {
            Error::InvalidData(format!(
                "element '{}' lacks scalar x/y/z properties",
                element.name
            ))
        };
        Ok(Self {
            x: x.ok_or_else(missing)?,
            y: y.ok_or_else(missing)?,
            z: z.ok_or_else(missing)?,
            red,
            green,
            blue,
            alpha,
        })
    }

    fn has_color(&self) -> bool {
        self.red.is_some() && self.green.is_some() && self.blue.is_some()
    }

    /// Project one decoded record, `read` supplying the raw value per field
    fn project(&self, read: impl Fn(Field) -> f64) -> PointRecord {
        let position = Point3d::new(read(self.x), read(self.y), read(self.z));
        let color = match (self.red, self.green, self.blue) {
            (Some(r), Some(g), Some(b)) => Rgba::new(
                color_channel(r.ty, read(r)),
                color_channel(g.ty, read(g)),
                color_channel(b.ty, read(b)),
                self.alpha
                    .map(|a| color_channel(a.ty, read(a)))
                    .unwrap_or(255),
            ),
            _ => Rgba::WHITE,
        };
        PointRecord::new(position, color)
    }
}

/// Scale a raw color value into the 0-255 display range
///
/// Policy: unsigned integers scale by their type maximum, signed integers
/// clamp negatives to zero then scale by the positive maximum, floats are
/// treated as unit range. Rounded to nearest.
fn color_channel(ty: ScalarType, value: f64) -> u8 {
    let scaled = match ty {
        ScalarType::UInt8 => value,
        ScalarType::Int8 => value.max(0.0) / i8::MAX as f64 * 255.0,
        ScalarType::UInt16 => value / u16::MAX as f64 * 255.0,
        ScalarType::Int16 => value.max(0.0) / i16::MAX as f64 * 255.0,
        ScalarType::UInt32 => value / u32::MAX as f64 * 255.0,
        ScalarType::Int32 => value.max(0.0) / i32::MAX as f64 * 255.0,
        ScalarType::Float32 | ScalarType::Float64 => value.clamp(0.0, 1.0) * 255.0,
    };
    scaled.round().clamp(0.0, 255.0) as u8
}

fn read_scalar<E: ByteOrder>(bytes: &[u8], ty: ScalarType) -> f64 {
    match ty {
        ScalarType::Int8 => bytes[0] as i8 as f64,
        ScalarType::UInt8 => bytes[0] as f64,
        ScalarType::Int16 => E::read_i16(bytes) as f64,
        ScalarType::UInt16 => E::read_u16(bytes) as f64,
        ScalarType::Int32 => E::read_i32(bytes) as f64,
        ScalarType::UInt32 => E::read_u32(bytes) as f64,
        ScalarType::Float32 => E::read_f32(bytes) as f64,
        ScalarType::Float64 => E::read_f64(bytes),
    }
}

/// Decode the data segment into the ordered point sequence
///
/// `data` is the byte slice starting at the offset returned by
/// `parse_header`. Decoding is deterministic and total: the same header and
/// buffer always produce the same sequence.
pub fn decode_point_cloud(header: &PlyHeader, data: &[u8]) -> Result<PointCloud> {
    let (vertex_index, _) = header
        .vertex_element()
        .ok_or_else(|| Error::InvalidData("no element with x/y/z properties".to_string()))?;

    // Lists are only tolerated after the vertex element, where nothing is
    // decoded anymore.
    for element in &header.elements[..=vertex_index] {
        if element.has_list() {
            return Err(Error::UnsupportedProperty(format!(
                "list property on element '{}' obstructs vertex decoding",
                element.name
            )));
        }
    }

    match header.format {
        PlyFormat::Ascii => decode_ascii(header, vertex_index, data),
        PlyFormat::BinaryLittleEndian => decode_binary::<LittleEndian>(header, vertex_index, data),
        PlyFormat::BinaryBigEndian => decode_binary::<BigEndian>(header, vertex_index, data),
    }
}

fn element_width(element: &Element) -> Result<usize> {
    element.record_width().ok_or_else(|| {
        Error::UnsupportedProperty(format!(
            "list property on element '{}' has no fixed width",
            element.name
        ))
    })
}

/// Bytes covered by `element`'s records, or `TruncatedData` when the
/// remaining buffer is too short
fn element_span(element: &Element, width: usize, remaining: usize) -> Result<usize> {
    match element.count.checked_mul(width) {
        Some(need) if need <= remaining => Ok(need),
        _ => Err(Error::TruncatedData(format!(
            "element '{}' declares {} records of {} bytes but only {} bytes remain",
            element.name, element.count, width, remaining
        ))),
    }
}

fn decode_binary<E: ByteOrder>(
    header: &PlyHeader,
    vertex_index: usize,
    data: &[u8],
) -> Result<PointCloud> {
    let mut cursor = 0usize;
    for element in &header.elements[..vertex_index] {
        cursor += element_span(element, element_width(element)?, data.len() - cursor)?;
    }

    let vertex = &header.elements[vertex_index];
    let width = element_width(vertex)?;
    element_span(vertex, width, data.len() - cursor)?;

    let layout = VertexLayout::resolve(vertex, false)?;
    let mut points = Vec::with_capacity(vertex.count);
    for i in 0..vertex.count {
        let record = &data[cursor + i * width..cursor + (i + 1) * width];
        points.push(layout.project(|f| read_scalar::<E>(&record[f.position..], f.ty)));
    }
    Ok(PointCloud::from_points(points, layout.has_color()))
}

fn decode_ascii(header: &PlyHeader, vertex_index: usize, data: &[u8]) -> Result<PointCloud> {
    let text = std::str::from_utf8(data)
        .map_err(|_| Error::InvalidData("ASCII payload is not valid UTF-8".to_string()))?;
    let mut tokens = text.split_whitespace();

    for element in &header.elements[..vertex_index] {
        let skip = element.count * element.properties.len();
        for _ in 0..skip {
            tokens.next().ok_or_else(|| {
                Error::TruncatedData(format!(
                    "element '{}' declares {} records but the payload ends early",
                    element.name, element.count
                ))
            })?;
        }
    }

    let vertex = &header.elements[vertex_index];
    let layout = VertexLayout::resolve(vertex, true)?;
    let width = vertex.properties.len();
    let mut row = vec![0.0f64; width];
    let mut points = Vec::with_capacity(vertex.count);
    for _ in 0..vertex.count {
        for slot in row.iter_mut() {
            let token = tokens.next().ok_or_else(|| {
                Error::TruncatedData(format!(
                    "element '{}' declares {} records but the payload ends early",
                    vertex.name, vertex.count
                ))
            })?;
            *slot = token.parse::<f64>().map_err(|_| {
                Error::InvalidData(format!("unparsable numeric token '{token}'"))
            })?;
        }
        points.push(layout.project(|f| row[f.position]));
    }
    Ok(PointCloud::from_points(points, layout.has_color()))
}
