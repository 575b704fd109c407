//! Joint-angle geometry over 2-D normalized keypoints.
//!
//! The interior vertex angle comes from the two-vector dot-product/arccos
//! formula and is therefore bounded to [0°, 180°] by construction; it cannot
//! represent reflex angles. The signed variant recovers the lost half-plane
//! via the cross-product sign and spans [-180°, 180°].

use serde::{Deserialize, Serialize};

use crate::domain::{ExerciseProfile, PoseFrame};

/// How the vertex angle is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleMode {
    /// Unsigned interior angle in [0°, 180°]. Default.
    Interior,
    /// Signed angle in [-180°, 180°]; negative when the far point sits in
    /// the clockwise half-plane of the vertex (sag vs. pike).
    Signed,
}

impl Default for AngleMode {
    fn default() -> Self {
        AngleMode::Interior
    }
}

/// One angle measurement over a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleReading {
    /// Angle at the vertex, in degrees, per the engine's [`AngleMode`].
    pub degrees: f64,
    /// True when the y-spread across the triple is below the horizontal
    /// threshold: body roughly prone/supine rather than standing.
    pub is_horizontal: bool,
}

/// Computes the form angle and horizontal flag for one exercise.
#[derive(Debug, Clone)]
pub struct AngleEngine {
    points: [usize; 3],
    mode: AngleMode,
    horizontal_threshold: f32,
}

impl AngleEngine {
    /// Build the engine from a profile's angle definition.
    pub fn from_profile(profile: &ExerciseProfile) -> Self {
        Self {
            points: profile.angle_points,
            mode: profile.angle_mode,
            horizontal_threshold: profile.horizontal_threshold,
        }
    }

    /// Measure the frame. `None` when any landmark of the triple is missing
    /// from the frame (index beyond what the detector produced).
    pub fn measure(&self, frame: &PoseFrame) -> Option<AngleReading> {
        let a = frame.landmark(self.points[0])?.point();
        let vertex = frame.landmark(self.points[1])?.point();
        let c = frame.landmark(self.points[2])?.point();

        let degrees = vertex_angle_degrees(a, vertex, c, self.mode);

        let ys = [a.1, vertex.1, c.1];
        let spread = ys.iter().cloned().fold(f32::MIN, f32::max)
            - ys.iter().cloned().fold(f32::MAX, f32::min);
        let is_horizontal = spread < self.horizontal_threshold;

        Some(AngleReading {
            degrees,
            is_horizontal,
        })
    }
}

/// Angle at `vertex` between the rays toward `a` and `c`, in degrees.
///
/// Degenerate triples (a ray of zero length) measure 0°, which never counts
/// as good form.
pub fn vertex_angle_degrees(
    a: (f32, f32),
    vertex: (f32, f32),
    c: (f32, f32),
    mode: AngleMode,
) -> f64 {
    let v1 = (f64::from(a.0 - vertex.0), f64::from(a.1 - vertex.1));
    let v2 = (f64::from(c.0 - vertex.0), f64::from(c.1 - vertex.1));

    let norms = (v1.0.hypot(v1.1)) * (v2.0.hypot(v2.1));
    if norms == 0.0 {
        return 0.0;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let interior = (dot / norms).clamp(-1.0, 1.0).acos().to_degrees();

    match mode {
        AngleMode::Interior => interior,
        AngleMode::Signed => {
            let cross = v1.0 * v2.1 - v1.1 * v2.0;
            if cross < 0.0 {
                -interior
            } else {
                interior
            }
        }
    }
}
