use std::collections::HashMap;
use std::io::BufRead;
use std::str::SplitWhitespace;

use super::{
    properties::{ByteOrder, PlyDataType, PlyPropertyDefinition, PlyPropertyType},
    PlyError,
};

/// Encoding of the PLY body.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PlyFormat {
    /// Whitespace separated text, one element instance per line.
    Ascii,
    /// Packed binary, little endian.
    BinaryLittleEndian,
    /// Packed binary, big endian.
    BinaryBigEndian,
}

impl PlyFormat {
    fn parse(format_str: &str) -> Result<Self, PlyError> {
        match format_str {
            "ascii" => Ok(PlyFormat::Ascii),
            "binary_little_endian" => Ok(PlyFormat::BinaryLittleEndian),
            "binary_big_endian" => Ok(PlyFormat::BinaryBigEndian),
            _ => Err(malformed(format!("unknown format '{format_str}'"))),
        }
    }

    /// Byte order of binary bodies. ASCII bodies are normalized to little endian on load.
    pub fn byte_order(&self) -> ByteOrder {
        match self {
            PlyFormat::BinaryBigEndian => ByteOrder::BigEndian,
            PlyFormat::Ascii | PlyFormat::BinaryLittleEndian => ByteOrder::LittleEndian,
        }
    }
}

/// A named, counted element declared in the header.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PlyElementDefinition {
    /// Element name, e.g. `vertex` or `face`.
    pub name: String,
    /// Number of instances stored in the body.
    pub count: usize,
    /// Properties of each instance, in storage order.
    pub properties: Vec<PlyPropertyDefinition>,
}

impl PlyElementDefinition {
    /// Index of the property called `name`.
    pub fn find_property(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    /// Name of the first property declared more than once, if any.
    pub fn duplicate_property(&self) -> Option<&str> {
        self.properties
            .iter()
            .enumerate()
            .find(|(i, p)| self.properties[..*i].iter().any(|q| q.name == p.name))
            .map(|(_, p)| p.name.as_str())
    }

    /// Map from property name to property index. The last one wins for duplicated names.
    pub fn property_indices(&self) -> HashMap<&str, usize> {
        self.properties
            .iter()
            .enumerate()
            .map(|(index, property)| (property.name.as_str(), index))
            .collect()
    }

    /// Size in bytes of one binary row, or `None` if the element has list properties.
    pub fn row_size(&self) -> Option<usize> {
        self.properties
            .iter()
            .map(PlyPropertyDefinition::fixed_size)
            .sum()
    }
}

/// Parsed PLY header.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PlyHeader {
    /// Body encoding.
    pub format: PlyFormat,
    /// Elements in body order.
    pub elements: Vec<PlyElementDefinition>,
    /// Text of `comment` lines.
    pub comments: Vec<String>,
}

fn malformed(reason: impl Into<String>) -> PlyError {
    PlyError::MalformedHeader(reason.into())
}

// Reads one header line including its terminator. Returns `false` at end of file.
fn read_header_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> Result<bool, PlyError> {
    line.clear();
    Ok(reader.read_until(b'\n', line)? != 0)
}

// The text after `keyword` if `line` starts with that keyword token.
fn strip_keyword<'a>(line: &'a [u8], keyword: &[u8]) -> Option<&'a [u8]> {
    let rest = line.strip_prefix(keyword)?;
    match rest.first() {
        None => Some(rest),
        Some(c) if c.is_ascii_whitespace() => Some(rest.trim_ascii()),
        Some(_) => None,
    }
}

pub(crate) fn parse_header<R: BufRead>(reader: &mut R) -> Result<PlyHeader, PlyError> {
    let mut line = Vec::new();
    if !read_header_line(reader, &mut line)? || line.trim_ascii() != b"ply" {
        return Err(malformed("missing 'ply' magic number"));
    }

    let mut format = None;
    let mut elements: Vec<PlyElementDefinition> = Vec::new();
    let mut comments = Vec::new();

    loop {
        if !read_header_line(reader, &mut line)? {
            return Err(malformed("unexpected end of file before 'end_header'"));
        }
        let bytes = line.trim_ascii();

        // free text, any encoding
        if let Some(text) = strip_keyword(bytes, b"comment") {
            comments.push(String::from_utf8_lossy(text).into_owned());
            continue;
        }
        if strip_keyword(bytes, b"obj_info").is_some() {
            continue;
        }

        let trimmed = std::str::from_utf8(bytes)
            .map_err(|_| malformed("header line is not valid UTF-8"))?;
        let mut parts = trimmed.split_whitespace();

        match parts.next() {
            None => continue,
            Some("end_header") => break,
            Some("format") => {
                if format.is_some() {
                    return Err(malformed("duplicate 'format' line"));
                }
                if !elements.is_empty() {
                    return Err(malformed("'format' line after the first element"));
                }
                let kind = parts.next().ok_or_else(|| malformed("missing format"))?;
                let version = parts.next().ok_or_else(|| malformed("missing format version"))?;
                if version != "1.0" {
                    return Err(malformed(format!("unsupported version '{version}'")));
                }
                format = Some(PlyFormat::parse(kind)?);
            }
            Some("element") => {
                let name = parts.next().ok_or_else(|| malformed("missing element name"))?;
                let count = parts
                    .next()
                    .and_then(|s| s.parse::<usize>().ok())
                    .ok_or_else(|| malformed(format!("invalid count for element '{name}'")))?;
                elements.push(PlyElementDefinition {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            Some("property") => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| malformed("property declared before any element"))?;
                element.properties.push(parse_property(&mut parts)?);
            }
            Some(keyword) => return Err(malformed(format!("unknown keyword '{keyword}'"))),
        }

        if parts.next().is_some() {
            return Err(malformed(format!("unexpected trailing tokens in '{trimmed}'")));
        }
    }

    let format = format.ok_or_else(|| malformed("missing 'format' line"))?;

    Ok(PlyHeader {
        format,
        elements,
        comments,
    })
}

fn parse_property(parts: &mut SplitWhitespace<'_>) -> Result<PlyPropertyDefinition, PlyError> {
    let type_str = parts.next().ok_or_else(|| malformed("missing property type"))?;

    let property_type = if type_str == "list" {
        let count = PlyDataType::parse(parts.next().ok_or_else(|| malformed("missing list count type"))?)?;
        let item = PlyDataType::parse(parts.next().ok_or_else(|| malformed("missing list item type"))?)?;
        if !count.is_integer() {
            return Err(malformed("list count type must be an integer type"));
        }
        PlyPropertyType::List { count, item }
    } else {
        PlyPropertyType::Scalar(PlyDataType::parse(type_str)?)
    };

    let name = parts.next().ok_or_else(|| malformed("missing property name"))?;

    Ok(PlyPropertyDefinition {
        name: name.to_string(),
        property_type,
    })
}
