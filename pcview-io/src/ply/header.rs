//! PLY header parsing
//!
//! The header is a newline-delimited textual block at the start of the file,
//! terminated by the literal line `end_header`. Parsing is a pure function of
//! the buffer prefix: it produces the element/property schema plus the exact
//! byte offset where the data segment begins.

use pcview_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on the sentinel scan
///
/// The header must be textual and terminate well before any binary payload
/// could plausibly begin; bounding the scan keeps a missing sentinel from
/// walking an entire large binary file.
pub const HEADER_SCAN_LIMIT: usize = 16 * 1024;

/// Fixed-width PLY scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl ScalarType {
    /// Parse a PLY type token, accepting both the short and long spellings
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "char" | "int8" => Ok(ScalarType::Int8),
            "uchar" | "uint8" => Ok(ScalarType::UInt8),
            "short" | "int16" => Ok(ScalarType::Int16),
            "ushort" | "uint16" => Ok(ScalarType::UInt16),
            "int" | "int32" => Ok(ScalarType::Int32),
            "uint" | "uint32" => Ok(ScalarType::UInt32),
            "float" | "float32" => Ok(ScalarType::Float32),
            "double" | "float64" => Ok(ScalarType::Float64),
            _ => Err(Error::UnsupportedProperty(format!(
                "unknown property type '{token}'"
            ))),
        }
    }

    /// Width in bytes of one value in a binary payload
    pub fn width(&self) -> usize {
        match self {
            ScalarType::Int8 | ScalarType::UInt8 => 1,
            ScalarType::Int16 | ScalarType::UInt16 => 2,
            ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Float32 => 4,
            ScalarType::Float64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Int8 => "int8",
            ScalarType::UInt8 => "uint8",
            ScalarType::Int16 => "int16",
            ScalarType::UInt16 => "uint16",
            ScalarType::Int32 => "int32",
            ScalarType::UInt32 => "uint32",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Scalar or list property shape
///
/// List declarations are recorded here; whether they are fatal is decided by
/// the decoder, which rejects any list it would actually have to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

/// A typed named field within an element's record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
}

impl Property {
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self.kind {
            PropertyKind::Scalar(ty) => Some(ty),
            PropertyKind::List { .. } => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, PropertyKind::List { .. })
    }
}

/// A named group of records in a PLY file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub count: usize,
    pub properties: Vec<Property>,
}

impl Element {
    /// Byte width of one record; `None` when a list property makes the
    /// width data-dependent
    pub fn record_width(&self) -> Option<usize> {
        self.properties
            .iter()
            .map(|p| p.scalar_type().map(|ty| ty.width()))
            .sum()
    }

    /// Whether a scalar property with the given name exists
    pub fn has_scalar(&self, name: &str) -> bool {
        self.properties
            .iter()
            .any(|p| p.name == name && !p.is_list())
    }

    pub fn has_list(&self) -> bool {
        self.properties.iter().any(Property::is_list)
    }
}

/// Payload encoding declared by the `format` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl fmt::Display for PlyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlyFormat::Ascii => "ascii",
            PlyFormat::BinaryLittleEndian => "binary_little_endian",
            PlyFormat::BinaryBigEndian => "binary_big_endian",
        };
        write!(f, "{name}")
    }
}

/// The parsed header: format plus the ordered element/property schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub version: String,
    pub comments: Vec<String>,
    pub obj_info: Vec<String>,
    pub elements: Vec<Element>,
}

impl PlyHeader {
    pub fn find_element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// The first element carrying scalar `x`, `y`, `z` properties
    ///
    /// Located by property names rather than by the element's own name, so
    /// unconventionally named vertex elements still decode.
    pub fn vertex_element(&self) -> Option<(usize, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .find(|(_, e)| e.has_scalar("x") && e.has_scalar("y") && e.has_scalar("z"))
    }
}

impl fmt::Display for PlyHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "format {} {}", self.format, self.version)?;
        for element in &self.elements {
            writeln!(f, "element {} {}", element.name, element.count)?;
            for property in &element.properties {
                match property.kind {
                    PropertyKind::Scalar(ty) => {
                        writeln!(f, "  property {} {}", ty.name(), property.name)?
                    }
                    PropertyKind::List { count, item } => writeln!(
                        f,
                        "  property list {} {} {}",
                        count.name(),
                        item.name(),
                        property.name
                    )?,
                }
            }
        }
        Ok(())
    }
}

/// Parse the header block at the start of `buf`
///
/// Returns the schema and the byte offset immediately following the
/// `end_header` line terminator, i.e. the start of the data segment.
pub fn parse_header(buf: &[u8]) -> Result<(PlyHeader, usize)> {
    let window_end = buf.len().min(HEADER_SCAN_LIMIT);
    let mut pos = 0usize;
    let mut saw_magic = false;
    let mut format: Option<(PlyFormat, String)> = None;
    let mut comments = Vec::new();
    let mut obj_info = Vec::new();
    let mut elements: Vec<Element> = Vec::new();
    let mut data_offset: Option<usize> = None;

    while pos < window_end {
        let (line_bytes, next) = match buf[pos..window_end].iter().position(|&b| b == b'\n') {
            Some(i) => (&buf[pos..pos + i], pos + i + 1),
            // A final unterminated line only counts if the buffer itself
            // ends inside the window; otherwise the sentinel was not found.
            None if window_end == buf.len() => (&buf[pos..window_end], window_end),
            None => break,
        };
        let line = std::str::from_utf8(line_bytes)
            .map_err(|_| Error::MalformedHeader("header is not valid text".to_string()))?
            .trim();
        pos = next;

        if line.is_empty() {
            continue;
        }
        if !saw_magic {
            if line != "ply" {
                return Err(Error::MalformedHeader(
                    "missing 'ply' magic line".to_string(),
                ));
            }
            saw_magic = true;
            continue;
        }
        if line == "end_header" {
            data_offset = Some(pos);
            break;
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("format") => {
                if format.is_some() {
                    return Err(Error::MalformedHeader(
                        "duplicate format line".to_string(),
                    ));
                }
                let fmt_token = tokens
                    .next()
                    .ok_or_else(|| Error::MalformedHeader("format line without type".to_string()))?;
                let parsed = match fmt_token {
                    "ascii" => PlyFormat::Ascii,
                    "binary_little_endian" => PlyFormat::BinaryLittleEndian,
                    "binary_big_endian" => PlyFormat::BinaryBigEndian,
                    other => {
                        return Err(Error::MalformedHeader(format!(
                            "unknown format '{other}'"
                        )))
                    }
                };
                let version = tokens.next().unwrap_or("1.0").to_string();
                format = Some((parsed, version));
            }
            Some("comment") => comments.push(rest_of_line(line, "comment")),
            Some("obj_info") => obj_info.push(rest_of_line(line, "obj_info")),
            Some("element") => {
                let name = tokens
                    .next()
                    .ok_or_else(|| Error::MalformedHeader("element without name".to_string()))?;
                let count = tokens
                    .next()
                    .and_then(|t| t.parse::<usize>().ok())
                    .ok_or_else(|| {
                        Error::MalformedHeader(format!("element '{name}' has no valid count"))
                    })?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            Some("property") => {
                let kind_token = tokens.next().ok_or_else(|| {
                    Error::MalformedHeader("property line without type".to_string())
                })?;
                let (kind, name) = if kind_token == "list" {
                    let count = ScalarType::parse(tokens.next().ok_or_else(|| {
                        Error::MalformedHeader("list property without count type".to_string())
                    })?)?;
                    let item = ScalarType::parse(tokens.next().ok_or_else(|| {
                        Error::MalformedHeader("list property without item type".to_string())
                    })?)?;
                    (PropertyKind::List { count, item }, tokens.next())
                } else {
                    (PropertyKind::Scalar(ScalarType::parse(kind_token)?), tokens.next())
                };
                let name = name.ok_or_else(|| {
                    Error::MalformedHeader("property line without name".to_string())
                })?;
                let element = elements.last_mut().ok_or_else(|| {
                    Error::MalformedHeader(format!(
                        "property '{name}' declared before any element"
                    ))
                })?;
                element.properties.push(Property {
                    name: name.to_string(),
                    kind,
                });
            }
            // Unrecognized keywords are ignored, matching common readers
            _ => {}
        }
    }

    let data_offset = data_offset.ok_or_else(|| {
        Error::MalformedHeader("end_header not found within scan bound".to_string())
    })?;
    let (format, version) = format
        .ok_or_else(|| Error::MalformedHeader("missing format line".to_string()))?;

    Ok((
        PlyHeader {
            format,
            version,
            comments,
            obj_info,
            elements,
        },
        data_offset,
    ))
}

fn rest_of_line(line: &str, keyword: &str) -> String {
    line[keyword.len()..].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_header() {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 10\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
        let (header, offset) = parse_header(text.as_bytes()).unwrap();
        assert_eq!(header.format, PlyFormat::BinaryLittleEndian);
        assert_eq!(header.version, "1.0");
        assert_eq!(header.elements.len(), 1);
        assert_eq!(header.elements[0].name, "vertex");
        assert_eq!(header.elements[0].count, 10);
        assert_eq!(header.elements[0].properties.len(), 3);
        assert_eq!(
            header.elements[0].properties[0].scalar_type(),
            Some(ScalarType::Float32)
        );
        assert_eq!(offset, text.len());
    }

    #[test]
    fn data_offset_points_past_sentinel() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n1 2 3\n";
        let (_, offset) = parse_header(text.as_bytes()).unwrap();
        assert_eq!(&text[offset..], "1 2 3\n");
    }

    #[test]
    fn keeps_comments_and_obj_info() {
        let text = "ply\nformat ascii 1.0\ncomment made by hand\nobj_info scanner v2\nelement vertex 0\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
        let (header, _) = parse_header(text.as_bytes()).unwrap();
        assert_eq!(header.comments, vec!["made by hand"]);
        assert_eq!(header.obj_info, vec!["scanner v2"]);
    }

    #[test]
    fn accepts_long_and_short_type_spellings() {
        let text = "ply\nformat ascii 1.0\nelement vertex 0\nproperty float32 x\nproperty double y\nproperty uchar z\nend_header\n";
        let (header, _) = parse_header(text.as_bytes()).unwrap();
        let types: Vec<_> = header.elements[0]
            .properties
            .iter()
            .map(|p| p.scalar_type().unwrap())
            .collect();
        assert_eq!(
            types,
            vec![ScalarType::Float32, ScalarType::Float64, ScalarType::UInt8]
        );
    }

    #[test]
    fn records_list_properties_in_schema() {
        let text = "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\nproperty float z\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n";
        let (header, _) = parse_header(text.as_bytes()).unwrap();
        let face = header.find_element("face").unwrap();
        assert!(face.has_list());
        assert_eq!(face.record_width(), None);
        assert_eq!(
            face.properties[0].kind,
            PropertyKind::List {
                count: ScalarType::UInt8,
                item: ScalarType::Int32,
            }
        );
    }

    #[test]
    fn missing_sentinel_is_malformed() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n";
        let err = parse_header(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn sentinel_outside_scan_bound_is_malformed() {
        let mut bytes = b"ply\nformat binary_little_endian 1.0\n".to_vec();
        bytes.extend(std::iter::repeat(b'\0').take(HEADER_SCAN_LIMIT));
        bytes.extend_from_slice(b"\nend_header\n");
        let err = parse_header(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn missing_format_is_malformed() {
        let text = "ply\nelement vertex 1\nproperty float x\nend_header\n";
        let err = parse_header(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn duplicate_format_is_malformed() {
        let text = "ply\nformat ascii 1.0\nformat ascii 1.0\nend_header\n";
        let err = parse_header(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn missing_magic_is_malformed() {
        let text = "format ascii 1.0\nend_header\n";
        let err = parse_header(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn property_before_element_is_malformed() {
        let text = "ply\nformat ascii 1.0\nproperty float x\nend_header\n";
        let err = parse_header(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn unknown_property_type_is_unsupported() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty quaternion x\nend_header\n";
        let err = parse_header(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedProperty(_)));
    }

    #[test]
    fn vertex_element_found_by_property_names() {
        let text = "ply\nformat ascii 1.0\nelement camera 1\nproperty float focal\nelement points 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
        let (header, _) = parse_header(text.as_bytes()).unwrap();
        let (idx, element) = header.vertex_element().unwrap();
        assert_eq!(idx, 1);
        assert_eq!(element.name, "points");
    }

    #[test]
    fn display_dumps_the_layout() {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nelement face 2\nproperty list uchar int vertex_indices\nend_header\n";
        let (header, _) = parse_header(text.as_bytes()).unwrap();
        let dump = header.to_string();
        assert!(dump.contains("format binary_little_endian 1.0"));
        assert!(dump.contains("element vertex 1"));
        assert!(dump.contains("property float32 x"));
        assert!(dump.contains("property list uint8 int32 vertex_indices"));
    }

    #[test]
    fn record_width_sums_property_widths() {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\nproperty double y\nproperty uchar z\nend_header\n";
        let (header, _) = parse_header(text.as_bytes()).unwrap();
        assert_eq!(header.elements[0].record_width(), Some(4 + 8 + 1));
    }
}
