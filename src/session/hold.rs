//! Hold tracker: the gated, user-visible timer.
//!
//! Runs only while the session is active. The good/bad decision is a hard
//! per-frame threshold comparison with no smoothing by default, so a value
//! oscillating across the boundary toggles the timer every frame. That is
//! documented behavior; an optional exit hysteresis can be opted into via
//! the profile.

use tracing::debug;

use crate::domain::ExerciseProfile;
use crate::geometry::AngleReading;

use super::timers::SessionTimers;

/// Per-frame form decision for one active frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormVerdict {
    /// Angle within the good band; hold time accrued.
    Good,
    /// Angle outside the band; a contiguous break is running.
    Breaking,
}

/// Accumulates good-form time and tracks contiguous break spans.
#[derive(Debug, Clone)]
pub struct HoldTracker {
    good_angle_min: f64,
    good_angle_max: f64,
    hysteresis_margin: f64,
    was_good: bool,
}

impl HoldTracker {
    /// Build the tracker from the profile's angle band.
    pub fn from_profile(profile: &ExerciseProfile) -> Self {
        Self {
            good_angle_min: profile.good_angle_min,
            good_angle_max: profile.good_angle_max,
            hysteresis_margin: profile.hysteresis_margin,
            was_good: false,
        }
    }

    /// Whether the angle counts as good form this frame.
    ///
    /// Band edges are inclusive. With a nonzero hysteresis margin a hold
    /// that is currently good only breaks once the angle leaves the widened
    /// band; entry is always at the exact thresholds.
    fn is_good(&self, degrees: f64) -> bool {
        let (min, max) = if self.was_good && self.hysteresis_margin > 0.0 {
            (
                self.good_angle_min - self.hysteresis_margin,
                self.good_angle_max + self.hysteresis_margin,
            )
        } else {
            (self.good_angle_min, self.good_angle_max)
        };
        degrees >= min && degrees <= max
    }

    /// Advance the tracker by one active frame.
    ///
    /// `dt` is the frame-clock delta to the previous accepted frame. Also
    /// maintains the stood-up span and the inactivity baseline: the session
    /// counts as "active" whenever the body is horizontal, independent of
    /// whether form is good.
    pub fn update(
        &mut self,
        timers: &mut SessionTimers,
        reading: &AngleReading,
        now: f64,
        dt: f64,
    ) -> FormVerdict {
        let verdict = if self.is_good(reading.degrees) {
            timers.hold_seconds += dt;
            timers.form_break_since = 0.0;
            self.was_good = true;
            FormVerdict::Good
        } else {
            if timers.form_break_since == 0.0 {
                timers.form_break_since = now;
                debug!(angle = reading.degrees, at = now, "form break started");
            }
            self.was_good = false;
            FormVerdict::Breaking
        };

        // Stood-up span and inactivity baseline track the horizontal check,
        // not the form verdict.
        if reading.is_horizontal {
            timers.stood_up_since = 0.0;
            timers.last_active_at = now;
        } else if timers.stood_up_since == 0.0 {
            timers.stood_up_since = now;
            debug!(at = now, "body left horizontal posture");
        }

        verdict
    }
}
