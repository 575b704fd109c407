//! Auto-end evaluation: five independent termination signals.
//!
//! Signals are only evaluated once the initial grace has expired, and are
//! checked in a fixed order every active frame; the first one to fire wins.
//! Break and stood-up tolerances are two-tier: generous before the user has
//! banked enough hold time, strict afterwards.

use tracing::info;

use crate::domain::{landmark_index, EndReason, ExerciseProfile, PoseFrame};

use super::timers::SessionTimers;

/// Evaluates the termination signals against the session timers.
#[derive(Debug, Clone)]
pub struct AutoEndEvaluator {
    collapse_gap: f32,
    collapse_hip_gap: f32,
    first_rep_grace: f64,
    recovery_window: f64,
    recovery_timeout: f64,
    break_grace: f64,
    post_recovery_timeout: f64,
    early_hold_floor: f64,
    stood_up_early_timeout: f64,
    stood_up_timeout: f64,
    inactivity_timeout: f64,
    max_duration: f64,
}

impl AutoEndEvaluator {
    /// Build the evaluator from a profile's thresholds.
    pub fn from_profile(profile: &ExerciseProfile) -> Self {
        Self {
            collapse_gap: profile.collapse_gap,
            collapse_hip_gap: profile.collapse_hip_gap,
            first_rep_grace: profile.first_rep_grace,
            recovery_window: profile.recovery_window,
            recovery_timeout: profile.recovery_timeout,
            break_grace: profile.break_grace,
            post_recovery_timeout: profile.post_recovery_timeout,
            early_hold_floor: profile.early_hold_floor,
            stood_up_early_timeout: profile.stood_up_early_timeout,
            stood_up_timeout: profile.stood_up_timeout,
            inactivity_timeout: profile.inactivity_timeout,
            max_duration: profile.max_duration,
        }
    }

    /// Auto-end is suppressed until some hold time exists or the initial
    /// grace window has passed.
    pub fn grace_expired(&self, timers: &SessionTimers, now: f64) -> bool {
        timers.hold_seconds > 0.0 || timers.since_ready(now) >= self.first_rep_grace
    }

    /// Form-break tolerance for the current amount of banked hold time.
    pub fn break_limit(&self, hold_seconds: f64) -> f64 {
        if hold_seconds < self.recovery_window {
            self.recovery_timeout
        } else {
            self.post_recovery_timeout
        }
    }

    /// Stood-up tolerance for the current amount of banked hold time.
    fn stood_up_limit(&self, hold_seconds: f64) -> f64 {
        if hold_seconds < self.early_hold_floor {
            self.stood_up_early_timeout
        } else {
            self.stood_up_timeout
        }
    }

    /// Check all five signals in order. Caller must have confirmed grace
    /// expiry first.
    pub fn evaluate(
        &self,
        frame: &PoseFrame,
        timers: &SessionTimers,
        now: f64,
    ) -> Option<EndReason> {
        // A. Collapse: wrists at shoulder and hip level, torso on the ground.
        if self.collapse_detected(frame) {
            info!(at = now, "collapse detected");
            return Some(EndReason::Collapse);
        }

        // B. Sustained form break, two-tier tolerance.
        if let Some(elapsed) = timers.form_break_elapsed(now) {
            let limit = self.break_limit(timers.hold_seconds);
            if elapsed > limit {
                info!(elapsed, limit, "form break outlasted its tolerance");
                return Some(EndReason::FormBreak);
            }
        }

        // C. Stood up, mirrors B's two-tier shape.
        if let Some(elapsed) = timers.stood_up_elapsed(now) {
            let limit = self.stood_up_limit(timers.hold_seconds);
            if elapsed > limit {
                info!(elapsed, limit, "user stood up");
                return Some(EndReason::StoodUp);
            }
        }

        // D. Inactivity: time since the last horizontal frame. Independent
        // of B; can fire with good form if the horizontal check fails.
        if timers.last_active_at != 0.0 && timers.since_active(now) > self.inactivity_timeout {
            info!(idle = timers.since_active(now), "inactivity timeout");
            return Some(EndReason::Inactivity);
        }

        // E. Hard cap.
        if timers.since_ready(now) >= self.max_duration {
            info!(duration = timers.since_ready(now), "maximum duration reached");
            return Some(EndReason::MaxDuration);
        }

        None
    }

    /// Feedback for a running break: quiet within the inner break grace,
    /// then a countdown toward the tier limit.
    pub fn break_feedback(&self, timers: &SessionTimers, now: f64) -> Option<String> {
        let elapsed = timers.form_break_elapsed(now)?;
        if elapsed <= self.break_grace {
            return Some("Adjust your form".to_string());
        }
        let remaining = (self.break_limit(timers.hold_seconds) - elapsed).max(0.0);
        Some(format!(
            "Get back into position — ending in {:.0}s",
            remaining.ceil()
        ))
    }

    fn collapse_detected(&self, frame: &PoseFrame) -> bool {
        use landmark_index::*;
        // Left/right pairs are averaged so one noisy side cannot fake a
        // collapse on its own. Missing landmarks skip the signal.
        let (Some(wrist_y), Some(shoulder_y), Some(hip_y)) = (
            frame.mean_y(&[LEFT_WRIST, RIGHT_WRIST]),
            frame.mean_y(&[LEFT_SHOULDER, RIGHT_SHOULDER]),
            frame.mean_y(&[LEFT_HIP, RIGHT_HIP]),
        ) else {
            return false;
        };
        wrist_y - shoulder_y < self.collapse_gap && wrist_y - hip_y < self.collapse_hip_gap
    }
}
