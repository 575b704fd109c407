//! The session orchestrator.
//!
//! Owns one session's state and timers, drives the gates, hold tracker, and
//! auto-end evaluator for every incoming frame, and emits a snapshot per
//! frame. `process_frame` is a pure transition of `(state, timers, frame)`:
//! no globals, no wall clock, so replaying an ordered frame sequence is
//! deterministic.

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{
    EndReason, ExerciseProfile, FinalReport, PoseFrame, SessionId, SessionSnapshot, SessionState,
};
use crate::gating::{ReadinessGate, VisibilityCheck, VisibilityGate};
use crate::geometry::AngleEngine;
use crate::{Result, SessionError};

use super::auto_end::AutoEndEvaluator;
use super::hold::{FormVerdict, HoldTracker};
use super::timers::SessionTimers;

/// Feedback when the angle triple itself is missing from a frame.
const MISSING_BODY_FEEDBACK: &str = "Body not fully visible — step into frame";

/// How an out-of-order frame timestamp is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// Drop the frame, log a warning, return the last snapshot. Default.
    #[default]
    Lenient,
    /// Return an error; for strict replay validation.
    Strict,
}

/// Per-session finite state machine.
///
/// Single-threaded by contract: frames must be fed in arrival order with no
/// concurrent calls on the same session. Independent sessions share nothing
/// mutable.
#[derive(Debug)]
pub struct SessionStateMachine {
    id: SessionId,
    profile: ExerciseProfile,
    state: SessionState,
    timers: SessionTimers,
    visibility: VisibilityGate,
    angle: AngleEngine,
    readiness: ReadinessGate,
    hold: HoldTracker,
    auto_end: AutoEndEvaluator,
    timestamp_policy: TimestampPolicy,
    last_snapshot: SessionSnapshot,
    visible_at: Option<f64>,
    report: Option<FinalReport>,
}

impl SessionStateMachine {
    /// Create a session for one exercise profile.
    ///
    /// Fails fast on an invalid profile; nothing is validated again on the
    /// per-frame path.
    pub fn new(profile: ExerciseProfile) -> Result<Self> {
        Self::with_policy(profile, TimestampPolicy::default())
    }

    /// Create a session with an explicit timestamp policy.
    pub fn with_policy(profile: ExerciseProfile, policy: TimestampPolicy) -> Result<Self> {
        profile.validate()?;
        Ok(Self {
            id: SessionId::new(),
            visibility: VisibilityGate::new(
                profile.visibility_floor,
                profile.landmark_groups.clone(),
            ),
            angle: AngleEngine::from_profile(&profile),
            readiness: ReadinessGate::new(profile.good_angle_min),
            hold: HoldTracker::from_profile(&profile),
            auto_end: AutoEndEvaluator::from_profile(&profile),
            timestamp_policy: policy,
            state: SessionState::AwaitingVisibility,
            timers: SessionTimers::new(),
            last_snapshot: SessionSnapshot::initial(),
            visible_at: None,
            report: None,
            profile,
        })
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The profile this session was created with.
    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    /// Last emitted snapshot, without advancing state.
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.last_snapshot
    }

    /// Final report, present once the session has ended.
    pub fn report(&self) -> Option<&FinalReport> {
        self.report.as_ref()
    }

    /// Drive the session by one frame.
    ///
    /// Terminal sessions are no-ops that return the last snapshot, so
    /// at-least-once delivery transports can safely replay. The only error
    /// path is a timestamp regression under [`TimestampPolicy::Strict`].
    pub fn process_frame(&mut self, frame: &PoseFrame) -> Result<SessionSnapshot> {
        if self.state.is_terminal() {
            return Ok(self.last_snapshot.clone());
        }

        let now = frame.timestamp;
        if self.timers.last_timestamp != 0.0 && now < self.timers.last_timestamp {
            warn!(
                session = %self.id,
                got = now,
                last = self.timers.last_timestamp,
                "frame timestamp regressed, frame ignored"
            );
            match self.timestamp_policy {
                TimestampPolicy::Lenient => return Ok(self.last_snapshot.clone()),
                TimestampPolicy::Strict => {
                    return Err(SessionError::TimestampRegression {
                        got: now,
                        last: self.timers.last_timestamp,
                    })
                }
            }
        }

        let snapshot = match self.state {
            SessionState::AwaitingVisibility | SessionState::AwaitingReady => {
                self.pre_active_frame(frame, now)
            }
            SessionState::Active => self.active_frame(frame, now),
            SessionState::Ended => self.last_snapshot.clone(),
        };

        self.timers.last_timestamp = now;
        self.last_snapshot = snapshot.clone();
        Ok(snapshot)
    }

    /// External stop call: force the session to `Ended` with a manual
    /// reason. Idempotent; the final report is available synchronously.
    pub fn end(&mut self) -> SessionSnapshot {
        if self.state.is_terminal() {
            return self.last_snapshot.clone();
        }
        let snapshot = self.end_with(EndReason::Manual, self.timers.last_timestamp);
        self.last_snapshot = snapshot.clone();
        snapshot
    }

    // ========================================================================
    // Per-state frame handling
    // ========================================================================

    fn pre_active_frame(&mut self, frame: &PoseFrame, now: f64) -> SessionSnapshot {
        if let VisibilityCheck::GroupFailed { feedback, .. } = self.visibility.check(frame) {
            // Timers do not advance while a group is out of frame. From
            // AwaitingReady this is feedback only; states never move back.
            return self.snapshot_with(feedback);
        }

        if self.state == SessionState::AwaitingVisibility {
            self.visible_at.get_or_insert(now);
            self.state = SessionState::AwaitingReady;
            info!(session = %self.id, at = now, "all landmark groups visible");
        }

        let Some(reading) = self.angle.measure(frame) else {
            return self.snapshot_with(MISSING_BODY_FEEDBACK.to_string());
        };

        if self.readiness.observe(&reading) {
            self.timers.ready_since = now;
            self.timers.last_active_at = now;
            self.state = SessionState::Active;
            info!(session = %self.id, at = now, "session active");
            return self.snapshot_with("Good form".to_string());
        }

        self.snapshot_with("Get into position".to_string())
    }

    fn active_frame(&mut self, frame: &PoseFrame, now: f64) -> SessionSnapshot {
        let Some(reading) = self.angle.measure(frame) else {
            // Missing landmark data: surfaced as feedback, no state change,
            // no timer movement beyond the frame clock itself.
            return self.snapshot_with(MISSING_BODY_FEEDBACK.to_string());
        };

        let dt = now - self.timers.last_timestamp;
        let verdict = self.hold.update(&mut self.timers, &reading, now, dt);

        if self.auto_end.grace_expired(&self.timers, now) {
            if let Some(reason) = self.auto_end.evaluate(frame, &self.timers, now) {
                return self.end_with(reason, now);
            }
        }

        let feedback = match verdict {
            FormVerdict::Good => "Good form".to_string(),
            FormVerdict::Breaking => self
                .auto_end
                .break_feedback(&self.timers, now)
                .unwrap_or_else(|| "Adjust your form".to_string()),
        };
        self.snapshot_with(feedback)
    }

    fn end_with(&mut self, reason: EndReason, ended_at: f64) -> SessionSnapshot {
        self.state = SessionState::Ended;
        self.report = Some(FinalReport {
            session_id: self.id,
            exercise: self.profile.name.clone(),
            total_hold_seconds: self.timers.hold_seconds,
            end_reason: reason,
            visible_at: self.visible_at,
            ready_at: (self.timers.ready_since != 0.0).then_some(self.timers.ready_since),
            ended_at,
            generated_at: Utc::now(),
        });
        info!(
            session = %self.id,
            reason = reason.as_str(),
            hold = self.timers.hold_seconds,
            at = ended_at,
            "session ended"
        );
        SessionSnapshot {
            state: SessionState::Ended,
            hold_seconds: self.timers.hold_seconds,
            feedback_message: end_feedback(reason).to_string(),
            is_ended: true,
            end_reason: Some(reason),
        }
    }

    fn snapshot_with(&self, feedback: String) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            hold_seconds: self.timers.hold_seconds,
            feedback_message: feedback,
            is_ended: self.state.is_terminal(),
            end_reason: self.report.as_ref().map(|r| r.end_reason),
        }
    }
}

fn end_feedback(reason: EndReason) -> &'static str {
    match reason {
        EndReason::Collapse => "Session ended: collapse detected",
        EndReason::FormBreak => "Session ended: form break too long",
        EndReason::StoodUp => "Session ended: you stood up",
        EndReason::Inactivity => "Session ended: no activity detected",
        EndReason::MaxDuration => "Session ended: maximum duration reached",
        EndReason::Manual => "Session ended",
    }
}
