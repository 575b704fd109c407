//! Readiness gate: one-way latch on the starting posture.

use tracing::info;

use crate::geometry::AngleReading;

/// Latches once the user has held valid starting posture for a single frame.
///
/// The latch is permanent: no later frame can revert it, so the session can
/// never fall back behind `Active`.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    good_angle_min: f64,
    ready: bool,
}

impl ReadinessGate {
    /// Create an unlatched gate for the given angle floor.
    pub fn new(good_angle_min: f64) -> Self {
        Self {
            good_angle_min,
            ready: false,
        }
    }

    /// Feed one reading. Returns true exactly on the frame that latches.
    pub fn observe(&mut self, reading: &AngleReading) -> bool {
        if self.ready {
            return false;
        }
        if reading.is_horizontal && reading.degrees >= self.good_angle_min {
            self.ready = true;
            info!(angle = reading.degrees, "starting posture reached, readiness latched");
            return true;
        }
        false
    }

    /// True once the latch has fired.
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}
