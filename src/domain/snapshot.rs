//! Session output values: per-frame snapshots and the end-of-session report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase of a session. Transitions are strictly forward except
/// self-loops within `Active`; `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// One or more landmark groups are below the visibility floor.
    AwaitingVisibility,
    /// All landmarks visible; waiting for the starting posture.
    AwaitingReady,
    /// Readiness latched; the hold timer is live.
    Active,
    /// Terminal. Further frames are no-ops.
    Ended,
}

impl SessionState {
    /// True once the session has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ended)
    }

    /// Short state name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::AwaitingVisibility => "awaiting_visibility",
            SessionState::AwaitingReady => "awaiting_ready",
            SessionState::Active => "active",
            SessionState::Ended => "ended",
        }
    }
}

/// Why a session ended. The first auto-end signal to fire wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Wrists reached shoulder and hip level: torso at the ground.
    Collapse,
    /// A contiguous form break outlasted its tier's tolerance.
    FormBreak,
    /// The body left the horizontal posture for too long.
    StoodUp,
    /// No horizontal frame within the inactivity timeout.
    Inactivity,
    /// Hard cap on session length reached.
    MaxDuration,
    /// External stop call.
    Manual,
}

impl EndReason {
    /// Wire/log name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Collapse => "collapse",
            EndReason::FormBreak => "form_break",
            EndReason::StoodUp => "stood_up",
            EndReason::Inactivity => "inactivity",
            EndReason::MaxDuration => "max_duration",
            EndReason::Manual => "manual",
        }
    }
}

/// Per-frame output of the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current lifecycle phase.
    pub state: SessionState,
    /// Accumulated good-form seconds. Monotonically non-decreasing.
    pub hold_seconds: f64,
    /// User-facing feedback for this frame.
    pub feedback_message: String,
    /// True once the session has ended.
    pub is_ended: bool,
    /// Set exactly when `is_ended` is true.
    pub end_reason: Option<EndReason>,
}

impl SessionSnapshot {
    pub(crate) fn initial() -> Self {
        Self {
            state: SessionState::AwaitingVisibility,
            hold_seconds: 0.0,
            feedback_message: String::new(),
            is_ended: false,
            end_reason: None,
        }
    }
}

/// End-of-session summary for the storage/reporting collaborator.
///
/// Phase timestamps are frame-clock seconds; only `generated_at` is
/// wall-clock, stamped when the report is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    /// Session this report belongs to.
    pub session_id: SessionId,
    /// Exercise name from the profile.
    pub exercise: String,
    /// Total validated hold time in seconds.
    pub total_hold_seconds: f64,
    /// Why the session ended.
    pub end_reason: EndReason,
    /// Frame time of the first all-visible frame, if any.
    pub visible_at: Option<f64>,
    /// Frame time the readiness latch fired, if it did.
    pub ready_at: Option<f64>,
    /// Frame time of termination.
    pub ended_at: f64,
    /// Wall-clock time the report was generated.
    pub generated_at: DateTime<Utc>,
}
