//! Visibility gate: required landmark groups must clear a confidence floor.

use tracing::debug;

use crate::domain::{LandmarkGroup, PoseFrame};

/// Outcome of a visibility check.
#[derive(Debug, Clone, PartialEq)]
pub enum VisibilityCheck {
    /// Every group cleared the floor.
    AllVisible,
    /// The first group (in check order) that failed. A landmark missing from
    /// the frame entirely counts the same as one below the floor.
    GroupFailed {
        /// Name of the failing group.
        name: String,
        /// User-facing feedback for the failure.
        feedback: String,
    },
}

impl VisibilityCheck {
    /// True when all groups are visible.
    pub fn is_all_visible(&self) -> bool {
        matches!(self, VisibilityCheck::AllVisible)
    }
}

/// Checks landmark groups against a visibility confidence floor.
///
/// Pure function of the frame: no internal state, no side effects.
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    floor: f32,
    groups: Vec<LandmarkGroup>,
}

impl VisibilityGate {
    /// Create a gate over the given groups, checked in order.
    pub fn new(floor: f32, groups: Vec<LandmarkGroup>) -> Self {
        Self { floor, groups }
    }

    /// Check the frame, returning the first failing group or all-visible.
    pub fn check(&self, frame: &PoseFrame) -> VisibilityCheck {
        for group in &self.groups {
            let failed = group.indices.iter().any(|&i| {
                frame
                    .landmark(i)
                    .map_or(true, |lm| lm.visibility < self.floor)
            });
            if failed {
                debug!(group = %group.name, "landmark group below visibility floor");
                return VisibilityCheck::GroupFailed {
                    name: group.name.clone(),
                    feedback: group.feedback.clone(),
                };
            }
        }
        VisibilityCheck::AllVisible
    }
}
