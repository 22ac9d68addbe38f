use super::{
    header::PlyElementDefinition,
    properties::{ByteOrder, PlyDataType, PlyPropertyType},
    PlyError,
};

/// How rows are laid out in the element buffer.
#[derive(Debug, Clone)]
pub(crate) enum RowLayout {
    /// Every row has the same size.
    Fixed(usize),
    /// Row `i` spans `offsets[i]..offsets[i + 1]`.
    Variable(Vec<usize>),
}

/// The materialized rows of one PLY element.
///
/// Binary bodies are kept in their on-disk byte order. ASCII bodies are
/// converted to little-endian binary rows on load.
#[derive(Debug, Clone)]
pub struct PlyElementData {
    definition: PlyElementDefinition,
    byte_order: ByteOrder,
    bytes: Vec<u8>,
    layout: RowLayout,
}

impl PlyElementData {
    pub(crate) fn new(
        definition: PlyElementDefinition,
        byte_order: ByteOrder,
        bytes: Vec<u8>,
        layout: RowLayout,
    ) -> Self {
        Self {
            definition,
            byte_order,
            bytes,
            layout,
        }
    }

    /// The header definition of the element.
    pub fn definition(&self) -> &PlyElementDefinition {
        &self.definition
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.definition.count
    }

    /// Check if the element has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definition.count == 0
    }

    fn row(&self, index: usize) -> &[u8] {
        match &self.layout {
            RowLayout::Fixed(stride) => &self.bytes[index * stride..(index + 1) * stride],
            RowLayout::Variable(offsets) => &self.bytes[offsets[index]..offsets[index + 1]],
        }
    }

    fn extraction_error(&self, reason: impl std::fmt::Display) -> PlyError {
        PlyError::Extraction(format!("element '{}': {reason}", self.definition.name))
    }

    // Byte offset of property `index` within `row`, walking any lists stored before it.
    fn property_offset(&self, row: &[u8], index: usize) -> Option<usize> {
        let mut offset = 0usize;
        for property in &self.definition.properties[..index] {
            let size = property.encoded_size(row.get(offset..)?, self.byte_order)?;
            offset = offset.checked_add(size)?;
        }
        Some(offset)
    }

    /// Extract the scalar properties at `indices` for every row into `out`, converted to `f32`.
    ///
    /// Values are interleaved row by row: `out[row * indices.len() + k]` holds
    /// property `indices[k]` of `row`. `out` must hold exactly
    /// `self.len() * indices.len()` values.
    pub fn extract_properties(&self, indices: &[usize], out: &mut [f32]) -> Result<(), PlyError> {
        let width = indices.len();
        let expected = self
            .len()
            .checked_mul(width)
            .ok_or_else(|| self.extraction_error("output size overflows"))?;
        if out.len() != expected {
            return Err(self.extraction_error(format!(
                "output buffer holds {} values, expected {expected}",
                out.len()
            )));
        }

        let mut columns: Vec<(usize, PlyDataType)> = Vec::with_capacity(width);
        for &index in indices {
            let property = self.definition.properties.get(index).ok_or_else(|| {
                self.extraction_error(format!("property index {index} is out of range"))
            })?;
            match property.property_type {
                PlyPropertyType::Scalar(data_type) => columns.push((index, data_type)),
                PlyPropertyType::List { .. } => {
                    return Err(self.extraction_error(format!(
                        "property '{}' is a list and cannot be read as a scalar",
                        property.name
                    )))
                }
            }
        }

        if width == 0 {
            return Ok(());
        }

        match &self.layout {
            RowLayout::Fixed(_) => {
                // offsets are the same for every row
                let mut offsets = Vec::with_capacity(width);
                for &(index, data_type) in &columns {
                    let offset: usize = self.definition.properties[..index]
                        .iter()
                        .filter_map(|p| p.fixed_size())
                        .sum();
                    offsets.push((offset, data_type));
                }
                for (row_index, values) in out.chunks_exact_mut(width).enumerate() {
                    let row = self.row(row_index);
                    for (value, &(offset, data_type)) in values.iter_mut().zip(&offsets) {
                        *value = data_type
                            .read_f32(&row[offset..], self.byte_order)
                            .ok_or_else(|| self.extraction_error(format!("row {row_index} is truncated")))?;
                    }
                }
            }
            RowLayout::Variable(_) => {
                for (row_index, values) in out.chunks_exact_mut(width).enumerate() {
                    let row = self.row(row_index);
                    for (value, &(index, data_type)) in values.iter_mut().zip(&columns) {
                        *value = self
                            .property_offset(row, index)
                            .and_then(|offset| data_type.read_f32(row.get(offset..)?, self.byte_order))
                            .ok_or_else(|| self.extraction_error(format!("row {row_index} is truncated")))?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ply::properties::PlyPropertyDefinition;

    fn xyz_definition(count: usize, data_type: PlyDataType) -> PlyElementDefinition {
        PlyElementDefinition {
            name: "vertex".to_string(),
            count,
            properties: vec![
                PlyPropertyDefinition::scalar("x", data_type),
                PlyPropertyDefinition::scalar("y", data_type),
                PlyPropertyDefinition::scalar("z", data_type),
            ],
        }
    }

    #[test]
    fn test_extract_fixed_rows() {
        let mut bytes = Vec::new();
        for v in [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let data = PlyElementData::new(
            xyz_definition(2, PlyDataType::Float32),
            ByteOrder::LittleEndian,
            bytes,
            RowLayout::Fixed(12),
        );

        let mut out = vec![0.0f32; 4];
        data.extract_properties(&[2, 0], &mut out).unwrap();
        assert_eq!(out, vec![3.0, 1.0, 6.0, 4.0]);
    }

    #[test]
    fn test_extract_big_endian_doubles() {
        let mut bytes = Vec::new();
        for v in [1.5f64, -2.0, 3.25] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let data = PlyElementData::new(
            xyz_definition(1, PlyDataType::Float64),
            ByteOrder::BigEndian,
            bytes,
            RowLayout::Fixed(24),
        );

        let mut out = vec![0.0f32; 3];
        data.extract_properties(&[0, 1, 2], &mut out).unwrap();
        assert_eq!(out, vec![1.5, -2.0, 3.25]);
    }

    #[test]
    fn test_extract_after_list_property() {
        let definition = PlyElementDefinition {
            name: "vertex".to_string(),
            count: 2,
            properties: vec![
                PlyPropertyDefinition {
                    name: "tags".to_string(),
                    property_type: PlyPropertyType::List {
                        count: PlyDataType::UInt8,
                        item: PlyDataType::UInt16,
                    },
                },
                PlyPropertyDefinition::scalar("x", PlyDataType::Float32),
            ],
        };
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&7u16.to_le_bytes());
        bytes.extend_from_slice(&10.0f32.to_le_bytes());
        let second_row = bytes.len();
        bytes.push(0);
        bytes.extend_from_slice(&20.0f32.to_le_bytes());
        let end = bytes.len();

        let data = PlyElementData::new(
            definition,
            ByteOrder::LittleEndian,
            bytes,
            RowLayout::Variable(vec![0, second_row, end]),
        );

        let mut out = vec![0.0f32; 2];
        data.extract_properties(&[1], &mut out).unwrap();
        assert_eq!(out, vec![10.0, 20.0]);

        let mut out = vec![0.0f32; 2];
        let err = data.extract_properties(&[0], &mut out).unwrap_err();
        assert!(matches!(err, PlyError::Extraction(_)));
    }

    #[test]
    fn test_extract_rejects_bad_arguments() {
        let data = PlyElementData::new(
            xyz_definition(1, PlyDataType::Float32),
            ByteOrder::LittleEndian,
            vec![0u8; 12],
            RowLayout::Fixed(12),
        );

        let mut out = vec![0.0f32; 2];
        assert!(data.extract_properties(&[0, 1, 2], &mut out).is_err());

        let mut out = vec![0.0f32; 1];
        assert!(data.extract_properties(&[5], &mut out).is_err());
    }
}
