#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Configuration of the vertex decoder.
pub mod config;

/// Vertex decoding from PLY files.
pub mod decoder;

/// PLY container parsing.
pub mod ply;

/// Decoded vertex cloud.
pub mod vertex_cloud;

pub use config::VertexDecodeConfig;
pub use decoder::{decode_vertices, read_ply_vertices, read_ply_vertices_with_config};
pub use ply::{PlyError, PlyErrorKind};
pub use vertex_cloud::VertexCloud;
