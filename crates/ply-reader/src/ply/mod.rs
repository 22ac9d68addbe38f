mod data;
mod header;
mod properties;
mod reader;

pub use data::PlyElementData;
pub use header::{PlyElementDefinition, PlyFormat, PlyHeader};
pub use properties::{ByteOrder, PlyDataType, PlyPropertyDefinition, PlyPropertyType};
pub use reader::PlyReader;

/// Error types for the PLY module.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PlyError {
    /// Failed to open or read the PLY file
    #[error("Failed to read PLY file. {0}")]
    Io(#[from] std::io::Error),

    /// The header does not follow the PLY grammar
    #[error("Malformed PLY header: {0}")]
    MalformedHeader(String),

    /// No element with the requested name
    #[error("Element '{0}' not found in PLY file")]
    NoVertexElement(String),

    /// The vertex element has no instances
    #[error("Element '{0}' has no instances")]
    EmptyVertexElement(String),

    /// A required property is missing from the vertex element
    #[error("Required property '{0}' not found in PLY file")]
    MissingProperty(String),

    /// Element data could not be read or converted
    #[error("Failed to extract properties: {0}")]
    Extraction(String),
}

/// The reason a decode failed, independent of the error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlyErrorKind {
    /// The file could not be opened or its header is not valid PLY.
    OpenOrParse,
    /// No vertex element.
    NoVertexElement,
    /// The vertex element has a count of zero.
    EmptyVertexElement,
    /// One of the position properties is missing.
    MissingProperty,
    /// The vertex data could not be read or converted to `f32`.
    Extraction,
}

impl PlyError {
    /// The reason of the failure.
    pub fn kind(&self) -> PlyErrorKind {
        match self {
            PlyError::Io(_) | PlyError::MalformedHeader(_) => PlyErrorKind::OpenOrParse,
            PlyError::NoVertexElement(_) => PlyErrorKind::NoVertexElement,
            PlyError::EmptyVertexElement(_) => PlyErrorKind::EmptyVertexElement,
            PlyError::MissingProperty(_) => PlyErrorKind::MissingProperty,
            PlyError::Extraction(_) => PlyErrorKind::Extraction,
        }
    }
}
