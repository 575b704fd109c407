//! # formgate
//!
//! A gated exercise-session engine: ingests a live stream of body-pose
//! keypoints (one [`PoseFrame`] per video frame, produced by an external
//! pose detector) and converts it into a validated session — a timer that
//! counts only the time the user holds correct form, plus automatic
//! detection of when the session should end.
//!
//! ## Architecture
//!
//! Leaf-to-root composition, one frame at a time:
//!
//! ```text
//! PoseFrame → VisibilityGate → AngleEngine → ReadinessGate / HoldTracker
//!           → AutoEndEvaluator → SessionSnapshot
//! ```
//!
//! - [`gating::VisibilityGate`] — required landmark groups must clear a
//!   confidence floor.
//! - [`geometry::AngleEngine`] — the form angle at a profile-defined vertex,
//!   plus a horizontal-posture flag.
//! - [`gating::ReadinessGate`] — one-way latch into the active phase.
//! - [`session::HoldTracker`] — the gated, user-visible hold timer.
//! - [`session::AutoEndEvaluator`] — five competing termination signals
//!   (collapse, sustained form break, stood up, inactivity, max duration).
//! - [`session::SessionStateMachine`] — the per-session orchestrator.
//! - [`registry::SessionRegistry`] — shared access to many concurrent
//!   sessions for a transport layer.
//!
//! Timestamps are always drawn from the frame stream, never a wall clock,
//! so replaying an ordered frame sequence is deterministic.
//!
//! ## Example
//!
//! ```rust
//! use formgate::{ExerciseProfile, SessionStateMachine, PoseFrame, Landmark};
//!
//! fn main() -> formgate::Result<()> {
//!     let mut session = SessionStateMachine::new(ExerciseProfile::plank())?;
//!
//!     // Frames come from the external pose detector.
//!     let frame = PoseFrame::new(0.033, vec![Landmark::new(0.5, 0.5, 0.9); 33]);
//!     let snapshot = session.process_frame(&frame)?;
//!     println!("{}: {}", snapshot.state.as_str(), snapshot.feedback_message);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod domain;
pub mod gating;
pub mod geometry;
pub mod registry;
pub mod session;

// Re-export main types
pub use domain::{
    default_landmark_groups, landmark_index, EndReason, ExerciseProfile, ExerciseProfileBuilder,
    FinalReport, Landmark, LandmarkGroup, PoseFrame, SessionId, SessionSnapshot, SessionState,
};
pub use gating::{ReadinessGate, VisibilityCheck, VisibilityGate};
pub use geometry::{AngleEngine, AngleMode, AngleReading};
pub use registry::{RegistryConfig, SessionEnded, SessionRegistry};
pub use session::{
    AutoEndEvaluator, FormVerdict, HoldTracker, SessionStateMachine, SessionTimers,
    TimestampPolicy,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Unified error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An exercise profile failed validation at session creation.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// A frame arrived with a timestamp behind the previous frame, under
    /// the strict timestamp policy.
    #[error("timestamp regression: frame at {got:.3}s arrived after {last:.3}s")]
    TimestampRegression {
        /// Timestamp of the offending frame.
        got: f64,
        /// Timestamp of the last accepted frame.
        last: f64,
    },

    /// The addressed session is not in the registry.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
}
