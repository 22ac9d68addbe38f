use super::PlyError;

/// Byte order of multi-byte values in a binary PLY body.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ByteOrder {
    /// Least significant byte first.
    LittleEndian,
    /// Most significant byte first.
    BigEndian,
}

/// Scalar type of a PLY property.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PlyDataType {
    /// `char` / `int8`
    Int8,
    /// `uchar` / `uint8`
    UInt8,
    /// `short` / `int16`
    Int16,
    /// `ushort` / `uint16`
    UInt16,
    /// `int` / `int32`
    Int32,
    /// `uint` / `uint32`
    UInt32,
    /// `float` / `float32`
    Float32,
    /// `double` / `float64`
    Float64,
}

// Decodes a fixed-size value from a slice of exactly `size_of::<$ty>()` bytes.
macro_rules! decode_scalar {
    ($ty:ty, $bytes:expr, $order:expr) => {{
        let raw: [u8; std::mem::size_of::<$ty>()] = $bytes.try_into().ok()?;
        match $order {
            ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
            ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
        }
    }};
}

// Parses an ASCII token and appends it as little-endian bytes.
macro_rules! encode_token {
    ($ty:ty, $token:expr, $out:expr) => {{
        let value: $ty = $token.parse().ok()?;
        $out.extend_from_slice(&value.to_le_bytes());
    }};
}

impl PlyDataType {
    /// Parse a type name as it appears in a `property` header line.
    pub fn parse(type_str: &str) -> Result<Self, PlyError> {
        match type_str {
            "char" | "int8" => Ok(PlyDataType::Int8),
            "uchar" | "uint8" => Ok(PlyDataType::UInt8),
            "short" | "int16" => Ok(PlyDataType::Int16),
            "ushort" | "uint16" => Ok(PlyDataType::UInt16),
            "int" | "int32" => Ok(PlyDataType::Int32),
            "uint" | "uint32" => Ok(PlyDataType::UInt32),
            "float" | "float32" => Ok(PlyDataType::Float32),
            "double" | "float64" => Ok(PlyDataType::Float64),
            _ => Err(PlyError::MalformedHeader(format!(
                "unknown property type '{type_str}'"
            ))),
        }
    }

    /// Size in bytes of one value in a binary body.
    pub fn size(&self) -> usize {
        match self {
            PlyDataType::Int8 | PlyDataType::UInt8 => 1,
            PlyDataType::Int16 | PlyDataType::UInt16 => 2,
            PlyDataType::Int32 | PlyDataType::UInt32 | PlyDataType::Float32 => 4,
            PlyDataType::Float64 => 8,
        }
    }

    /// Whether the type is an integer type, i.e. usable as a list length.
    pub fn is_integer(&self) -> bool {
        !matches!(self, PlyDataType::Float32 | PlyDataType::Float64)
    }

    /// Decode the value at the start of `bytes`, converted to `f32`.
    ///
    /// Returns `None` if `bytes` is shorter than [`PlyDataType::size`].
    pub(crate) fn read_f32(&self, bytes: &[u8], order: ByteOrder) -> Option<f32> {
        let bytes = bytes.get(..self.size())?;
        let value = match self {
            PlyDataType::Int8 => bytes[0] as i8 as f32,
            PlyDataType::UInt8 => bytes[0] as f32,
            PlyDataType::Int16 => decode_scalar!(i16, bytes, order) as f32,
            PlyDataType::UInt16 => decode_scalar!(u16, bytes, order) as f32,
            PlyDataType::Int32 => decode_scalar!(i32, bytes, order) as f32,
            PlyDataType::UInt32 => decode_scalar!(u32, bytes, order) as f32,
            PlyDataType::Float32 => decode_scalar!(f32, bytes, order),
            PlyDataType::Float64 => decode_scalar!(f64, bytes, order) as f32,
        };
        Some(value)
    }

    /// Decode a list length at the start of `bytes`.
    ///
    /// Returns `None` for short input, float types and negative lengths.
    pub(crate) fn read_count(&self, bytes: &[u8], order: ByteOrder) -> Option<usize> {
        let bytes = bytes.get(..self.size())?;
        match self {
            PlyDataType::Int8 => usize::try_from(bytes[0] as i8).ok(),
            PlyDataType::UInt8 => Some(bytes[0] as usize),
            PlyDataType::Int16 => usize::try_from(decode_scalar!(i16, bytes, order)).ok(),
            PlyDataType::UInt16 => Some(decode_scalar!(u16, bytes, order) as usize),
            PlyDataType::Int32 => usize::try_from(decode_scalar!(i32, bytes, order)).ok(),
            PlyDataType::UInt32 => usize::try_from(decode_scalar!(u32, bytes, order)).ok(),
            PlyDataType::Float32 | PlyDataType::Float64 => None,
        }
    }

    /// Parse an ASCII body token and append it in little-endian layout.
    pub(crate) fn encode_ascii(&self, token: &str, out: &mut Vec<u8>) -> Option<()> {
        match self {
            PlyDataType::Int8 => encode_token!(i8, token, out),
            PlyDataType::UInt8 => encode_token!(u8, token, out),
            PlyDataType::Int16 => encode_token!(i16, token, out),
            PlyDataType::UInt16 => encode_token!(u16, token, out),
            PlyDataType::Int32 => encode_token!(i32, token, out),
            PlyDataType::UInt32 => encode_token!(u32, token, out),
            PlyDataType::Float32 => encode_token!(f32, token, out),
            PlyDataType::Float64 => encode_token!(f64, token, out),
        }
        Some(())
    }
}

/// Type of a PLY property: a single scalar or a length-prefixed list.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PlyPropertyType {
    /// A single value.
    Scalar(PlyDataType),
    /// A list of `item` values prefixed with its length stored as `count`.
    List {
        /// Type of the length prefix.
        count: PlyDataType,
        /// Type of each list item.
        item: PlyDataType,
    },
}

/// A named property of a PLY element.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PlyPropertyDefinition {
    /// Property name.
    pub name: String,
    /// Declared property type.
    pub property_type: PlyPropertyType,
}

impl PlyPropertyDefinition {
    /// Create a scalar property definition.
    pub fn scalar(name: impl Into<String>, data_type: PlyDataType) -> Self {
        Self {
            name: name.into(),
            property_type: PlyPropertyType::Scalar(data_type),
        }
    }

    /// Whether the property is a list.
    pub fn is_list(&self) -> bool {
        matches!(self.property_type, PlyPropertyType::List { .. })
    }

    /// Size in bytes of the property in a binary row, if it does not depend on the data.
    pub fn fixed_size(&self) -> Option<usize> {
        match self.property_type {
            PlyPropertyType::Scalar(data_type) => Some(data_type.size()),
            PlyPropertyType::List { .. } => None,
        }
    }

    /// Size in bytes of the property value stored at the start of `bytes`.
    pub(crate) fn encoded_size(&self, bytes: &[u8], order: ByteOrder) -> Option<usize> {
        match self.property_type {
            PlyPropertyType::Scalar(data_type) => Some(data_type.size()),
            PlyPropertyType::List { count, item } => {
                let len = count.read_count(bytes, order)?;
                len.checked_mul(item.size())?.checked_add(count.size())
            }
        }
    }
}
