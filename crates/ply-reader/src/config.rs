use serde::{Deserialize, Serialize};

/// Which element and properties the vertex decoder reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexDecodeConfig {
    /// Name of the element holding the points.
    pub element_name: String,
    /// Names of the x, y and z properties.
    pub position_properties: [String; 3],
    /// Candidate names of the timestamp property, probed in order. The first
    /// one present in the element is used.
    pub timestamp_properties: Vec<String>,
}

impl Default for VertexDecodeConfig {
    fn default() -> Self {
        Self {
            element_name: "vertex".to_string(),
            position_properties: ["x".to_string(), "y".to_string(), "z".to_string()],
            timestamp_properties: vec!["timestamp".to_string(), "t".to_string(), "time".to_string()],
        }
    }
}

impl VertexDecodeConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the element name.
    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = name.into();
        self
    }

    /// Set the position property names.
    pub fn with_position_properties(mut self, x: &str, y: &str, z: &str) -> Self {
        self.position_properties = [x.to_string(), y.to_string(), z.to_string()];
        self
    }

    /// Set the timestamp candidates. An empty list disables timestamps.
    pub fn with_timestamp_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.timestamp_properties = names.into_iter().map(Into::into).collect();
        self
    }
}
