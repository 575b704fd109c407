//! Per-exercise threshold profile.
//!
//! Every exercise shares the same state-machine code and differs only by the
//! injected profile: the landmark triple the angle is measured on plus the
//! tunable thresholds. Profiles are immutable once a session is created.

use serde::{Deserialize, Serialize};

use crate::geometry::AngleMode;
use crate::{Result, SessionError};

use super::pose::{default_landmark_groups, landmark_index, LandmarkGroup};

/// Immutable configuration for one exercise type.
///
/// All durations are in seconds on the frame clock; angles in degrees;
/// positions and gaps in normalized image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    /// Exercise name, carried into the final report.
    pub name: String,
    /// The (point, vertex, point) landmark triple the form angle is measured on.
    pub angle_points: [usize; 3],
    /// Angle interpretation. `Interior` is the documented legacy behavior:
    /// the measured angle is bounded to [0°, 180°], so a `good_angle_max`
    /// above 180° is dead configuration and good form degenerates to the
    /// lower bound alone. `Signed` makes the upper bound reachable.
    pub angle_mode: AngleMode,
    /// Minimum angle counted as good form.
    pub good_angle_min: f64,
    /// Maximum angle counted as good form (see `angle_mode`).
    pub good_angle_max: f64,
    /// Max y-spread across the angle triple for the body to count as horizontal.
    pub horizontal_threshold: f32,
    /// Minimum landmark confidence to treat a keypoint as present.
    pub visibility_floor: f32,
    /// Collapse: wrist-to-shoulder y gap below this is ground level.
    pub collapse_gap: f32,
    /// Collapse: wrist-to-hip y gap below this is ground level.
    pub collapse_hip_gap: f32,
    /// Auto-end signals are suppressed this long after readiness, until the
    /// first good-form time accrues.
    pub first_rep_grace: f64,
    /// Hold time below which a form break gets the generous timeout.
    pub recovery_window: f64,
    /// Generous contiguous-break limit (early in the session).
    pub recovery_timeout: f64,
    /// Break duration before the countdown feedback appears.
    pub break_grace: f64,
    /// Strict contiguous-break limit (past the recovery window).
    pub post_recovery_timeout: f64,
    /// Hold time below which standing up gets the generous timeout.
    pub early_hold_floor: f64,
    /// Generous stood-up limit (early in the session).
    pub stood_up_early_timeout: f64,
    /// Strict stood-up limit.
    pub stood_up_timeout: f64,
    /// Seconds without a horizontal frame before the session ends.
    pub inactivity_timeout: f64,
    /// Hard cap on session length measured from readiness.
    pub max_duration: f64,
    /// Optional exit hysteresis on the good-form angle test. 0.0 keeps the
    /// documented per-frame hard comparison (boundary flicker and all).
    pub hysteresis_margin: f64,
    /// Visibility groups in check order.
    pub landmark_groups: Vec<LandmarkGroup>,
}

impl Default for ExerciseProfile {
    fn default() -> Self {
        use landmark_index::*;
        Self {
            name: "exercise".to_string(),
            angle_points: [LEFT_SHOULDER, LEFT_HIP, LEFT_ANKLE],
            angle_mode: AngleMode::Interior,
            good_angle_min: 150.0,
            good_angle_max: 195.0,
            horizontal_threshold: 0.25,
            visibility_floor: 0.5,
            collapse_gap: 0.03,
            collapse_hip_gap: 0.06,
            first_rep_grace: 30.0,
            recovery_window: 15.0,
            recovery_timeout: 8.0,
            break_grace: 3.0,
            post_recovery_timeout: 1.5,
            early_hold_floor: 15.0,
            stood_up_early_timeout: 10.0,
            stood_up_timeout: 1.5,
            inactivity_timeout: 10.0,
            max_duration: 300.0,
            hysteresis_margin: 0.0,
            landmark_groups: default_landmark_groups(),
        }
    }
}

impl ExerciseProfile {
    /// Create a profile builder.
    pub fn builder() -> ExerciseProfileBuilder {
        ExerciseProfileBuilder::default()
    }

    /// The canonical prone hold: shoulder-hip-ankle angle, body horizontal.
    pub fn plank() -> Self {
        Self {
            name: "plank".to_string(),
            ..Self::default()
        }
    }

    /// Side hold variant: stricter angle floor, same landmark triple.
    pub fn side_plank() -> Self {
        Self {
            name: "side_plank".to_string(),
            good_angle_min: 160.0,
            ..Self::default()
        }
    }

    /// Validate the profile. Called at session construction; a rejected
    /// profile never reaches the per-frame path.
    pub fn validate(&self) -> Result<()> {
        if self.good_angle_max <= self.good_angle_min {
            return Err(SessionError::InvalidProfile(format!(
                "good_angle_max ({}) must exceed good_angle_min ({})",
                self.good_angle_max, self.good_angle_min
            )));
        }
        let durations = [
            ("first_rep_grace", self.first_rep_grace),
            ("recovery_window", self.recovery_window),
            ("recovery_timeout", self.recovery_timeout),
            ("break_grace", self.break_grace),
            ("post_recovery_timeout", self.post_recovery_timeout),
            ("early_hold_floor", self.early_hold_floor),
            ("stood_up_early_timeout", self.stood_up_early_timeout),
            ("stood_up_timeout", self.stood_up_timeout),
            ("inactivity_timeout", self.inactivity_timeout),
            ("max_duration", self.max_duration),
            ("hysteresis_margin", self.hysteresis_margin),
        ];
        for (field, value) in durations {
            if value < 0.0 {
                return Err(SessionError::InvalidProfile(format!(
                    "{} must not be negative (got {})",
                    field, value
                )));
            }
        }
        if self.landmark_groups.is_empty() {
            return Err(SessionError::InvalidProfile(
                "at least one landmark group is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ExerciseProfile`].
#[derive(Debug, Default)]
pub struct ExerciseProfileBuilder {
    profile: ExerciseProfile,
}

impl ExerciseProfileBuilder {
    /// Set the exercise name.
    pub fn name(mut self, name: &str) -> Self {
        self.profile.name = name.to_string();
        self
    }

    /// Set the (point, vertex, point) angle triple.
    pub fn angle_points(mut self, points: [usize; 3]) -> Self {
        self.profile.angle_points = points;
        self
    }

    /// Set the angle interpretation mode.
    pub fn angle_mode(mut self, mode: AngleMode) -> Self {
        self.profile.angle_mode = mode;
        self
    }

    /// Set the good-form angle band.
    pub fn good_angle_range(mut self, min: f64, max: f64) -> Self {
        self.profile.good_angle_min = min;
        self.profile.good_angle_max = max;
        self
    }

    /// Set the horizontal y-spread threshold, clamped to [0, 1].
    pub fn horizontal_threshold(mut self, threshold: f32) -> Self {
        self.profile.horizontal_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the visibility confidence floor, clamped to [0, 1].
    pub fn visibility_floor(mut self, floor: f32) -> Self {
        self.profile.visibility_floor = floor.clamp(0.0, 1.0);
        self
    }

    /// Set the collapse detection gaps.
    pub fn collapse_gaps(mut self, shoulder_gap: f32, hip_gap: f32) -> Self {
        self.profile.collapse_gap = shoulder_gap;
        self.profile.collapse_hip_gap = hip_gap;
        self
    }

    /// Set the initial grace period.
    pub fn first_rep_grace(mut self, seconds: f64) -> Self {
        self.profile.first_rep_grace = seconds;
        self
    }

    /// Set the two-tier form-break tolerances.
    pub fn break_limits(mut self, window: f64, generous: f64, strict: f64) -> Self {
        self.profile.recovery_window = window;
        self.profile.recovery_timeout = generous;
        self.profile.post_recovery_timeout = strict;
        self
    }

    /// Set the two-tier stood-up tolerances.
    pub fn stood_up_limits(mut self, hold_floor: f64, generous: f64, strict: f64) -> Self {
        self.profile.early_hold_floor = hold_floor;
        self.profile.stood_up_early_timeout = generous;
        self.profile.stood_up_timeout = strict;
        self
    }

    /// Set the inactivity timeout.
    pub fn inactivity_timeout(mut self, seconds: f64) -> Self {
        self.profile.inactivity_timeout = seconds;
        self
    }

    /// Set the hard session cap.
    pub fn max_duration(mut self, seconds: f64) -> Self {
        self.profile.max_duration = seconds;
        self
    }

    /// Set the optional good-form exit hysteresis.
    pub fn hysteresis_margin(mut self, degrees: f64) -> Self {
        self.profile.hysteresis_margin = degrees;
        self
    }

    /// Replace the visibility groups (checked in the given order).
    pub fn landmark_groups(mut self, groups: Vec<LandmarkGroup>) -> Self {
        self.profile.landmark_groups = groups;
        self
    }

    /// Validate and build the profile.
    pub fn build(self) -> Result<ExerciseProfile> {
        self.profile.validate()?;
        Ok(self.profile)
    }
}
