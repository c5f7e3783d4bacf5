//! Placeholder frame analysis.
//!
//! Real feature extraction (and enemy detection) is a separate pipeline
//! that has not been built; the core treats the feature vector as an
//! opaque input of known arity. Until an extractor lands, every frame
//! analyses to the same fixed vector and the same two markers, which keeps
//! the loop, the classifier and the overlay exercisable end-to-end.

use crate::capture::Frame;
use crate::decision::Enemy;

/// Number of features the strategy classifier consumes.
pub const FEATURE_ARITY: usize = 11;

/// Fixed-length feature vector fed to the strategy model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f32; FEATURE_ARITY]);

impl FeatureVector {
    /// The stand-in vector used while no real extractor exists.
    pub fn placeholder() -> Self {
        Self([0.5; FEATURE_ARITY])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Derive the feature vector for a frame.
pub fn extract_features(_frame: &Frame) -> FeatureVector {
    FeatureVector::placeholder()
}

/// Locate hostile markers in a frame.
///
/// Placeholder positions in overlay coordinates, matching the fixed layout
/// the overlay was tuned against.
pub fn locate_enemies(_frame: &Frame) -> Vec<Enemy> {
    vec![
        Enemy {
            id: "hostile-1".into(),
            x: 200,
            y: 400,
        },
        Enemy {
            id: "hostile-2".into(),
            x: 600,
            y: 800,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FrameProvider;
    use crate::capture::SyntheticFrames;
    use approx::assert_relative_eq;

    #[test]
    fn placeholder_vector_has_fixed_arity_and_value() {
        let frame = SyntheticFrames::new().capture_frame().expect("capture");
        let features = extract_features(&frame);
        assert_eq!(features.as_slice().len(), FEATURE_ARITY);
        for &value in features.as_slice() {
            assert_relative_eq!(value, 0.5);
        }
    }

    #[test]
    fn placeholder_markers_are_stable() {
        let frame = SyntheticFrames::new().capture_frame().expect("capture");
        let enemies = locate_enemies(&frame);
        assert_eq!(enemies.len(), 2);
        assert_eq!(enemies[0].id, "hostile-1");
        assert_eq!((enemies[1].x, enemies[1].y), (600, 800));
    }
}
