use std::io::BufRead;
use std::path::Path;

use crate::config::VertexDecodeConfig;
use crate::ply::{PlyError, PlyReader};
use crate::vertex_cloud::VertexCloud;

/// Read the vertex positions and timestamps of a PLY file.
///
/// Uses [`VertexDecodeConfig::default`]: positions from `x`, `y`, `z` of the
/// `vertex` element, timestamps from the first of `timestamp`, `t`, `time`.
pub fn read_ply_vertices(path: impl AsRef<Path>) -> Result<VertexCloud, PlyError> {
    read_ply_vertices_with_config(path, &VertexDecodeConfig::default())
}

/// Read the vertex positions and timestamps of a PLY file with an explicit configuration.
pub fn read_ply_vertices_with_config(
    path: impl AsRef<Path>,
    config: &VertexDecodeConfig,
) -> Result<VertexCloud, PlyError> {
    let reader = PlyReader::open(path)?;
    decode(reader, config)
}

/// Decode the vertex positions and timestamps of a PLY stream.
pub fn decode_vertices<R: BufRead>(
    reader: R,
    config: &VertexDecodeConfig,
) -> Result<VertexCloud, PlyError> {
    let reader = PlyReader::new(reader)?;
    decode(reader, config)
}

fn decode<R: BufRead>(
    mut reader: PlyReader<R>,
    config: &VertexDecodeConfig,
) -> Result<VertexCloud, PlyError> {
    let element_index = reader
        .find_element(&config.element_name)
        .ok_or_else(|| PlyError::NoVertexElement(config.element_name.clone()))?;

    let data = reader.load_element(element_index)?;
    let element = data.definition();
    if element.count == 0 {
        return Err(PlyError::EmptyVertexElement(element.name.clone()));
    }

    if let Some(name) = element.duplicate_property() {
        return Err(PlyError::MalformedHeader(format!(
            "duplicate property '{name}' in element '{}'",
            element.name
        )));
    }
    let property_indices = element.property_indices();

    let mut columns = Vec::with_capacity(4);
    for name in &config.position_properties {
        let index = property_indices
            .get(name.as_str())
            .ok_or_else(|| PlyError::MissingProperty(name.clone()))?;
        columns.push(*index);
    }

    // first candidate present wins
    let timestamp = config
        .timestamp_properties
        .iter()
        .find_map(|name| property_indices.get(name.as_str()).map(|&index| (name, index)));
    if let Some((name, index)) = timestamp {
        log::debug!("reading timestamps from property '{name}'");
        columns.push(index);
    }

    let width = columns.len();
    let len = element
        .count
        .checked_mul(width)
        .ok_or_else(|| PlyError::Extraction("vertex buffer size overflows".to_string()))?;
    let mut buffer = vec![0f32; len];
    data.extract_properties(&columns, &mut buffer)?;

    VertexCloud::from_interleaved(&buffer, width, timestamp.map(|(name, _)| name.clone()))
}
