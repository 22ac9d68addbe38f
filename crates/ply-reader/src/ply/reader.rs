use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::{
    data::{PlyElementData, RowLayout},
    header::{parse_header, PlyElementDefinition, PlyFormat, PlyHeader},
    properties::{ByteOrder, PlyPropertyType},
    PlyError,
};

/// A PLY container opened for reading.
///
/// The header is parsed on construction. Element bodies are read in file
/// order on demand with [`PlyReader::load_element`].
pub struct PlyReader<R> {
    reader: R,
    header: PlyHeader,
    // index of the element whose body starts at the current stream position
    next_element: usize,
}

impl PlyReader<BufReader<File>> {
    /// Open the PLY file at `path` and parse its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlyError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> PlyReader<R> {
    /// Parse the header from `reader`, leaving it positioned at the start of the body.
    pub fn new(mut reader: R) -> Result<Self, PlyError> {
        let header = parse_header(&mut reader)?;
        log::debug!(
            "parsed PLY header: format {:?}, elements {:?}",
            header.format,
            header
                .elements
                .iter()
                .map(|e| (e.name.as_str(), e.count))
                .collect::<Vec<_>>()
        );

        Ok(Self {
            reader,
            header,
            next_element: 0,
        })
    }

    /// The parsed header.
    pub fn header(&self) -> &PlyHeader {
        &self.header
    }

    /// The elements declared in the header, in file order.
    pub fn elements(&self) -> &[PlyElementDefinition] {
        &self.header.elements
    }

    /// Index of the first element called `name`.
    pub fn find_element(&self, name: &str) -> Option<usize> {
        self.header.elements.iter().position(|e| e.name == name)
    }

    /// Read the rows of element `index` into memory.
    ///
    /// Bodies of the elements stored before it are skipped. The stream only
    /// moves forward, so an element preceding one that was already loaded
    /// cannot be loaded anymore.
    pub fn load_element(&mut self, index: usize) -> Result<PlyElementData, PlyError> {
        let Self {
            reader,
            header,
            next_element,
        } = self;

        let element = header.elements.get(index).ok_or_else(|| {
            PlyError::Extraction(format!("element index {index} is out of range"))
        })?;
        if index < *next_element {
            return Err(PlyError::Extraction(format!(
                "element '{}' precedes the current stream position",
                element.name
            )));
        }

        while *next_element < index {
            let skipped = &header.elements[*next_element];
            log::debug!("skipping element '{}' ({} rows)", skipped.name, skipped.count);
            skip_element(reader, header.format, skipped)?;
            *next_element += 1;
        }

        let data = read_element(reader, header.format, element)?;
        *next_element = index + 1;

        Ok(data)
    }
}

fn truncated(element: &PlyElementDefinition) -> PlyError {
    PlyError::Extraction(format!("element '{}' data is truncated", element.name))
}

fn row_error(element: &PlyElementDefinition, row: usize, reason: &str) -> PlyError {
    PlyError::Extraction(format!("element '{}' row {row}: {reason}", element.name))
}

// Appends exactly `len` bytes from `reader` to `bytes`, growing with the data read.
fn read_bytes<R: Read>(
    reader: &mut R,
    len: usize,
    bytes: &mut Vec<u8>,
    element: &PlyElementDefinition,
) -> Result<(), PlyError> {
    let read = reader
        .by_ref()
        .take(len as u64)
        .read_to_end(bytes)
        .map_err(|_| truncated(element))?;
    if read != len {
        return Err(truncated(element));
    }
    Ok(())
}

fn skip_element<R: BufRead>(
    reader: &mut R,
    format: PlyFormat,
    element: &PlyElementDefinition,
) -> Result<(), PlyError> {
    match (format, element.row_size()) {
        (PlyFormat::BinaryLittleEndian | PlyFormat::BinaryBigEndian, Some(stride)) => {
            let total = stride
                .checked_mul(element.count)
                .ok_or_else(|| PlyError::MalformedHeader(format!("element '{}' is too large", element.name)))?;
            let skipped = std::io::copy(&mut reader.by_ref().take(total as u64), &mut std::io::sink())
                .map_err(|_| truncated(element))?;
            if skipped != total as u64 {
                return Err(truncated(element));
            }
            Ok(())
        }
        _ => read_element(reader, format, element).map(|_| ()),
    }
}

fn read_element<R: BufRead>(
    reader: &mut R,
    format: PlyFormat,
    element: &PlyElementDefinition,
) -> Result<PlyElementData, PlyError> {
    match format {
        PlyFormat::Ascii => read_ascii_element(reader, element),
        PlyFormat::BinaryLittleEndian | PlyFormat::BinaryBigEndian => {
            read_binary_element(reader, format.byte_order(), element)
        }
    }
}

fn read_binary_element<R: BufRead>(
    reader: &mut R,
    byte_order: ByteOrder,
    element: &PlyElementDefinition,
) -> Result<PlyElementData, PlyError> {
    let mut bytes = Vec::new();

    if let Some(stride) = element.row_size() {
        let total = stride
            .checked_mul(element.count)
            .ok_or_else(|| PlyError::MalformedHeader(format!("element '{}' is too large", element.name)))?;
        read_bytes(reader, total, &mut bytes, element)?;
        return Ok(PlyElementData::new(
            element.clone(),
            byte_order,
            bytes,
            RowLayout::Fixed(stride),
        ));
    }

    let mut offsets = vec![0];
    for row in 0..element.count {
        for property in &element.properties {
            match property.property_type {
                PlyPropertyType::Scalar(data_type) => {
                    read_bytes(reader, data_type.size(), &mut bytes, element)?
                }
                PlyPropertyType::List { count, item } => {
                    let start = bytes.len();
                    read_bytes(reader, count.size(), &mut bytes, element)?;
                    let len = count
                        .read_count(&bytes[start..], byte_order)
                        .and_then(|n| n.checked_mul(item.size()))
                        .ok_or_else(|| row_error(element, row, "invalid list length"))?;
                    read_bytes(reader, len, &mut bytes, element)?;
                }
            }
        }
        offsets.push(bytes.len());
    }

    Ok(PlyElementData::new(
        element.clone(),
        byte_order,
        bytes,
        RowLayout::Variable(offsets),
    ))
}

fn read_ascii_element<R: BufRead>(
    reader: &mut R,
    element: &PlyElementDefinition,
) -> Result<PlyElementData, PlyError> {
    let mut bytes = Vec::new();
    let mut offsets = vec![0];
    let mut line = String::new();

    for row in 0..element.count {
        // one instance per non-empty line
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .map_err(|e| row_error(element, row, &e.to_string()))?;
            if read == 0 {
                return Err(truncated(element));
            }
            if !line.trim().is_empty() {
                break;
            }
        }

        let mut tokens = line.split_whitespace();
        for property in &element.properties {
            match property.property_type {
                PlyPropertyType::Scalar(data_type) => {
                    let token = tokens
                        .next()
                        .ok_or_else(|| row_error(element, row, "missing value"))?;
                    data_type.encode_ascii(token, &mut bytes).ok_or_else(|| {
                        row_error(element, row, &format!("invalid value '{token}' for '{}'", property.name))
                    })?;
                }
                PlyPropertyType::List { count, item } => {
                    let token = tokens
                        .next()
                        .ok_or_else(|| row_error(element, row, "missing list length"))?;
                    let len: usize = token
                        .parse()
                        .map_err(|_| row_error(element, row, &format!("invalid list length '{token}'")))?;
                    count
                        .encode_ascii(token, &mut bytes)
                        .ok_or_else(|| row_error(element, row, &format!("invalid list length '{token}'")))?;
                    for _ in 0..len {
                        let token = tokens
                            .next()
                            .ok_or_else(|| row_error(element, row, "missing list item"))?;
                        item.encode_ascii(token, &mut bytes).ok_or_else(|| {
                            row_error(element, row, &format!("invalid list item '{token}'"))
                        })?;
                    }
                }
            }
        }

        if tokens.next().is_some() {
            return Err(row_error(element, row, "unexpected trailing values"));
        }
        offsets.push(bytes.len());
    }

    let layout = match element.row_size() {
        Some(stride) => RowLayout::Fixed(stride),
        None => RowLayout::Variable(offsets),
    };

    Ok(PlyElementData::new(
        element.clone(),
        ByteOrder::LittleEndian,
        bytes,
        layout,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader_for(bytes: Vec<u8>) -> PlyReader<Cursor<Vec<u8>>> {
        PlyReader::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_load_ascii_element() {
        let text = "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty uchar red\nend_header\n1.5 10\n\n-2 20\n";
        let mut reader = reader_for(text.as_bytes().to_vec());
        assert_eq!(reader.find_element("vertex"), Some(0));

        let data = reader.load_element(0).unwrap();
        assert_eq!(data.len(), 2);

        let mut out = vec![0.0f32; 4];
        data.extract_properties(&[0, 1], &mut out).unwrap();
        assert_eq!(out, vec![1.5, 10.0, -2.0, 20.0]);
    }

    #[test]
    fn test_skip_preceding_binary_elements() {
        let header = "ply\nformat binary_little_endian 1.0\nelement face 2\nproperty list uchar int vertex_indices\nelement camera 1\nproperty double fx\nelement vertex 1\nproperty float x\nend_header\n";
        let mut bytes = header.as_bytes().to_vec();
        // face 0: 3 indices, face 1: 0 indices
        bytes.push(3);
        for i in [0i32, 1, 2] {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        bytes.push(0);
        bytes.extend_from_slice(&500.0f64.to_le_bytes());
        bytes.extend_from_slice(&42.0f32.to_le_bytes());

        let mut reader = reader_for(bytes);
        let index = reader.find_element("vertex").unwrap();
        assert_eq!(index, 2);

        let data = reader.load_element(index).unwrap();
        let mut out = vec![0.0f32; 1];
        data.extract_properties(&[0], &mut out).unwrap();
        assert_eq!(out, vec![42.0]);

        // the stream only moves forward
        assert!(matches!(reader.load_element(0), Err(PlyError::Extraction(_))));
        assert!(matches!(reader.load_element(7), Err(PlyError::Extraction(_))));
    }

    #[test]
    fn test_skip_preceding_ascii_elements() {
        let text = "ply\nformat ascii 1.0\nelement face 1\nproperty list uchar int vertex_indices\nelement vertex 1\nproperty int x\nend_header\n4 0 1 2 3\n-12\n";
        let mut reader = reader_for(text.as_bytes().to_vec());
        let data = reader.load_element(1).unwrap();
        let mut out = vec![0.0f32; 1];
        data.extract_properties(&[0], &mut out).unwrap();
        assert_eq!(out, vec![-12.0]);
    }

    #[test]
    fn test_truncated_binary_body() {
        let header = "ply\nformat binary_big_endian 1.0\nelement vertex 2\nproperty float x\nend_header\n";
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(&1.0f32.to_be_bytes());

        let mut reader = reader_for(bytes);
        assert!(matches!(reader.load_element(0), Err(PlyError::Extraction(_))));
    }

    #[test]
    fn test_ascii_row_errors() {
        let cases = [
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nend_header\n1.0\n",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n1.0 2.0\n",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\nnan-ish\n",
            "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nend_header\n1.0\n",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty list uchar float v\nend_header\n3 1.0 2.0\n",
        ];

        for case in cases {
            let mut reader = reader_for(case.as_bytes().to_vec());
            let result = reader.load_element(0);
            assert!(
                matches!(result, Err(PlyError::Extraction(_))),
                "expected extraction error for {case:?}"
            );
        }
    }

    #[test]
    fn test_open_missing_file() {
        let result = PlyReader::open("/this/path/does/not/exist.ply");
        assert!(matches!(result, Err(PlyError::Io(_))));
    }
}
