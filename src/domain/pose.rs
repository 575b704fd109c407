//! Pose-frame value objects: landmarks, frames, and named landmark groups.
//!
//! Frames are produced by an external pose detector and consumed read-only.
//! Positions are normalized [0, 1] image coordinates with y growing downward;
//! timestamps are monotonic seconds on a caller-owned clock, never wall-clock.

use serde::{Deserialize, Serialize};

/// Indices into the fixed 33-point skeletal topology used by the pose detector.
pub mod landmark_index {
    /// Nose tip.
    pub const NOSE: usize = 0;
    /// Left shoulder.
    pub const LEFT_SHOULDER: usize = 11;
    /// Right shoulder.
    pub const RIGHT_SHOULDER: usize = 12;
    /// Left wrist.
    pub const LEFT_WRIST: usize = 15;
    /// Right wrist.
    pub const RIGHT_WRIST: usize = 16;
    /// Left hip.
    pub const LEFT_HIP: usize = 23;
    /// Right hip.
    pub const RIGHT_HIP: usize = 24;
    /// Left knee.
    pub const LEFT_KNEE: usize = 25;
    /// Right knee.
    pub const RIGHT_KNEE: usize = 26;
    /// Left ankle.
    pub const LEFT_ANKLE: usize = 27;
    /// Right ankle.
    pub const RIGHT_ANKLE: usize = 28;
    /// Total number of landmarks in the topology.
    pub const LANDMARK_COUNT: usize = 33;
}

/// A single tracked body keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized horizontal position.
    pub x: f32,
    /// Normalized vertical position (grows downward).
    pub y: f32,
    /// Detection confidence in [0, 1].
    pub visibility: f32,
}

impl Landmark {
    /// Create a landmark.
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    /// Position as an (x, y) pair.
    pub fn point(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// One set of keypoints for one video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Monotonic seconds on the caller's clock.
    pub timestamp: f64,
    /// Landmarks keyed by the fixed topology in [`landmark_index`].
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    /// Create a frame from a timestamp and landmark list.
    pub fn new(timestamp: f64, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp,
            landmarks,
        }
    }

    /// Landmark at a topology index, if the detector produced it.
    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// Mean y over a set of indices. `None` if any index is missing.
    pub fn mean_y(&self, indices: &[usize]) -> Option<f32> {
        if indices.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &i in indices {
            sum += self.landmark(i)?.y;
        }
        Some(sum / indices.len() as f32)
    }
}

/// A named subset of landmark indices with a user-facing feedback message
/// shown when the group fails the visibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkGroup {
    /// Short group name ("Shoulders", "Legs", ...).
    pub name: String,
    /// Topology indices belonging to the group.
    pub indices: Vec<usize>,
    /// Message surfaced while the group is not visible.
    pub feedback: String,
}

impl LandmarkGroup {
    /// Create a group with the standard "not visible" feedback message.
    pub fn new(name: &str, indices: Vec<usize>) -> Self {
        Self {
            name: name.to_string(),
            feedback: format!("{} not visible — step into frame", name),
            indices,
        }
    }
}

/// The default check order: head, shoulders, torso, legs.
pub fn default_landmark_groups() -> Vec<LandmarkGroup> {
    use landmark_index::*;
    vec![
        LandmarkGroup::new("Head", vec![NOSE]),
        LandmarkGroup::new("Shoulders", vec![LEFT_SHOULDER, RIGHT_SHOULDER]),
        LandmarkGroup::new("Torso", vec![LEFT_HIP, RIGHT_HIP]),
        LandmarkGroup::new(
            "Legs",
            vec![LEFT_KNEE, RIGHT_KNEE, LEFT_ANKLE, RIGHT_ANKLE],
        ),
    ]
}
