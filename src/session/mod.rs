//! The per-session state machine and its parts.
//!
//! - [`SessionTimers`]: the frame-clock timer block.
//! - [`HoldTracker`]: gated accumulation of good-form time.
//! - [`AutoEndEvaluator`]: the five competing termination signals.
//! - [`SessionStateMachine`]: the orchestrator driving all of the above.

mod auto_end;
mod hold;
mod machine;
mod timers;

pub use auto_end::AutoEndEvaluator;
pub use hold::{FormVerdict, HoldTracker};
pub use machine::{SessionStateMachine, TimestampPolicy};
pub use timers::SessionTimers;
