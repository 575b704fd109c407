//! Domain module containing the session's value objects.
//!
//! - **Input contract**: [`PoseFrame`] and its landmarks, produced by the
//!   external pose detector and consumed read-only.
//! - **Configuration**: [`ExerciseProfile`], the immutable per-exercise
//!   threshold set injected into every session.
//! - **Output contract**: [`SessionSnapshot`] per frame and [`FinalReport`]
//!   at termination.

pub mod pose;
pub mod profile;
pub mod snapshot;

pub use pose::{
    default_landmark_groups, landmark_index, Landmark, LandmarkGroup, PoseFrame,
};
pub use profile::{ExerciseProfile, ExerciseProfileBuilder};
pub use snapshot::{EndReason, FinalReport, SessionId, SessionSnapshot, SessionState};
