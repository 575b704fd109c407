//! Frame gates that sit in front of the hold timer.
//!
//! - [`VisibilityGate`]: are the required landmark groups confidently in
//!   frame at all?
//! - [`ReadinessGate`]: has the user entered the starting posture at least
//!   once? A one-way latch; it never reverts.

mod readiness;
mod visibility;

pub use readiness::ReadinessGate;
pub use visibility::{VisibilityCheck, VisibilityGate};
