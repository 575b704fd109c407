//! Per-session timer block.
//!
//! Every field is either `0.0` (unset) or a timestamp drawn from the frame
//! stream. Nothing here reads a wall clock, which keeps replay deterministic.
//! Each block is owned exclusively by its session's state machine; there is
//! no module-level or static timer state anywhere in the crate.

/// Mutable per-session timers, all on the caller's frame clock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTimers {
    /// Frame time the readiness latch fired. 0.0 = not yet.
    pub ready_since: f64,
    /// Accumulated good-form seconds. Monotonically non-decreasing.
    pub hold_seconds: f64,
    /// Start of the current contiguous form break. 0.0 = no break running.
    pub form_break_since: f64,
    /// Start of the current contiguous non-horizontal span. 0.0 = none.
    pub stood_up_since: f64,
    /// Frame time of the last horizontal frame (inactivity baseline).
    pub last_active_at: f64,
    /// Timestamp of the last accepted frame; regression guard and dt source.
    pub last_timestamp: f64,
}

impl SessionTimers {
    /// Fresh timer block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the readiness latch, or 0.0 before it fires.
    pub fn since_ready(&self, now: f64) -> f64 {
        if self.ready_since == 0.0 {
            0.0
        } else {
            now - self.ready_since
        }
    }

    /// Length of the running form break, if one is running.
    pub fn form_break_elapsed(&self, now: f64) -> Option<f64> {
        if self.form_break_since == 0.0 {
            None
        } else {
            Some(now - self.form_break_since)
        }
    }

    /// Length of the running stood-up span, if one is running.
    pub fn stood_up_elapsed(&self, now: f64) -> Option<f64> {
        if self.stood_up_since == 0.0 {
            None
        } else {
            Some(now - self.stood_up_since)
        }
    }

    /// Seconds since the last horizontal frame.
    pub fn since_active(&self, now: f64) -> f64 {
        if self.last_active_at == 0.0 {
            0.0
        } else {
            now - self.last_active_at
        }
    }
}
