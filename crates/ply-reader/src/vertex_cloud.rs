use crate::ply::PlyError;

/// Decoded vertex positions with optional per-point timestamps.
///
/// `timestamps` is either empty or holds exactly one value per position,
/// aligned by index.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexCloud {
    // The positions of the points, in file order.
    positions: Vec<[f32; 3]>,
    // The timestamps of the points, empty if the file has none.
    timestamps: Vec<f32>,
    // Name of the property the timestamps were read from.
    timestamp_property: Option<String>,
}

impl VertexCloud {
    /// Create a vertex cloud, checking that timestamps and positions line up.
    pub fn new(
        positions: Vec<[f32; 3]>,
        timestamps: Vec<f32>,
        timestamp_property: Option<String>,
    ) -> Result<Self, PlyError> {
        let expected = match timestamp_property {
            Some(_) => positions.len(),
            None => 0,
        };
        if timestamps.len() != expected {
            return Err(PlyError::Extraction(format!(
                "{} timestamps for {} positions",
                timestamps.len(),
                positions.len()
            )));
        }

        Ok(Self {
            positions,
            timestamps,
            timestamp_property,
        })
    }

    /// Split an interleaved buffer of rows `[x, y, z]` or `[x, y, z, t]`.
    ///
    /// `width` must be 4 exactly when `timestamp_property` is set, 3 otherwise.
    pub fn from_interleaved(
        buffer: &[f32],
        width: usize,
        timestamp_property: Option<String>,
    ) -> Result<Self, PlyError> {
        let expected_width = if timestamp_property.is_some() { 4 } else { 3 };
        if width != expected_width || buffer.len() % width != 0 {
            return Err(PlyError::Extraction(format!(
                "cannot split {} values into rows of {width}",
                buffer.len()
            )));
        }

        let positions = buffer
            .chunks_exact(width)
            .map(|row| [row[0], row[1], row[2]])
            .collect();
        let timestamps = if width == 4 {
            buffer.chunks_exact(4).map(|row| row[3]).collect()
        } else {
            Vec::new()
        };

        Self::new(positions, timestamps, timestamp_property)
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the cloud has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Get the positions.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Get the positions as a row-major `N x 3` slice.
    pub fn positions_flat(&self) -> &[f32] {
        self.positions.as_flattened()
    }

    /// Get the timestamps. Empty if the file had no timestamp property.
    pub fn timestamps(&self) -> &[f32] {
        &self.timestamps
    }

    /// Check if the cloud carries timestamps.
    pub fn has_timestamps(&self) -> bool {
        self.timestamp_property.is_some()
    }

    /// Name of the property the timestamps were read from.
    pub fn timestamp_property(&self) -> Option<&str> {
        self.timestamp_property.as_deref()
    }

    /// Take ownership of the positions and timestamps.
    pub fn into_parts(self) -> (Vec<[f32; 3]>, Vec<f32>) {
        (self.positions, self.timestamps)
    }

    /// Component-wise minimum of the positions.
    pub fn min_bound(&self) -> Option<[f32; 3]> {
        self.fold_positions(f32::min)
    }

    /// Component-wise maximum of the positions.
    pub fn max_bound(&self) -> Option<[f32; 3]> {
        self.fold_positions(f32::max)
    }

    /// Smallest and largest timestamp.
    pub fn timestamp_range(&self) -> Option<(f32, f32)> {
        let first = *self.timestamps.first()?;
        Some(
            self.timestamps
                .iter()
                .fold((first, first), |(lo, hi), &t| (lo.min(t), hi.max(t))),
        )
    }

    fn fold_positions(&self, f: impl Fn(f32, f32) -> f32) -> Option<[f32; 3]> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold(first, |acc, p| {
            [f(acc[0], p[0]), f(acc[1], p[1]), f(acc[2], p[2])]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_interleaved_with_timestamps() {
        let buffer = [1.0, 2.0, 3.0, 0.5, 4.0, 5.0, 6.0, 1.5];
        let cloud = VertexCloud::from_interleaved(&buffer, 4, Some("t".to_string())).unwrap();

        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.positions(), &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(cloud.positions_flat(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(cloud.timestamps(), &[0.5, 1.5]);
        assert!(cloud.has_timestamps());
        assert_eq!(cloud.timestamp_property(), Some("t"));
        assert_eq!(cloud.timestamp_range(), Some((0.5, 1.5)));
    }

    #[test]
    fn test_from_interleaved_without_timestamps() {
        let buffer = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let cloud = VertexCloud::from_interleaved(&buffer, 3, None).unwrap();

        assert_eq!(cloud.len(), 2);
        assert!(cloud.timestamps().is_empty());
        assert!(!cloud.has_timestamps());
        assert_eq!(cloud.timestamp_range(), None);
    }

    #[test]
    fn test_from_interleaved_rejects_bad_layout() {
        assert!(VertexCloud::from_interleaved(&[1.0, 2.0, 3.0, 4.0], 3, None).is_err());
        assert!(VertexCloud::from_interleaved(&[1.0, 2.0, 3.0, 4.0], 4, None).is_err());
        assert!(VertexCloud::from_interleaved(&[1.0, 2.0, 3.0], 3, Some("t".into())).is_err());
    }

    #[test]
    fn test_new_rejects_misaligned_timestamps() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        assert!(VertexCloud::new(positions.clone(), vec![0.0], Some("t".into())).is_err());
        assert!(VertexCloud::new(positions.clone(), vec![0.0, 1.0], None).is_err());
        assert!(VertexCloud::new(positions, vec![0.0, 1.0], Some("t".into())).is_ok());
    }

    #[test]
    fn test_bounds() {
        let cloud = VertexCloud::new(
            vec![[0.0, 5.0, -1.0], [2.0, -3.0, 4.0], [1.0, 1.0, 1.0]],
            Vec::new(),
            None,
        )
        .unwrap();
        assert_eq!(cloud.min_bound(), Some([0.0, -3.0, -1.0]));
        assert_eq!(cloud.max_bound(), Some([2.0, 5.0, 4.0]));

        let (positions, timestamps) = cloud.into_parts();
        assert_eq!(positions.len(), 3);
        assert!(timestamps.is_empty());

        let empty = VertexCloud::new(Vec::new(), Vec::new(), None).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.min_bound(), None);
    }
}
