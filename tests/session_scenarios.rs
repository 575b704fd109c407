//! End-to-end session scenarios.
//!
//! Drives full frame streams through [`SessionStateMachine`] and
//! [`SessionRegistry`] the way a transport layer would: ordered timestamps,
//! realistic frame rates, and assertions on the emitted snapshots and the
//! final report.

use formgate::domain::landmark_index::*;
use formgate::{
    EndReason, ExerciseProfile, Landmark, PoseFrame, SessionRegistry, SessionState,
    SessionStateMachine,
};

// ============================================================================
// Frame builders
// ============================================================================

/// Horizontal body with the shoulder-hip-ankle angle set to `angle_deg`.
///
/// Hip at (0.5, 0.5), ankle at (0.75, 0.5); the shoulder is placed on a
/// 0.25-radius arc around the hip, so the vertical spread of the angle
/// triple stays under the horizontal threshold for any plank-like angle.
fn horizontal_frame(ts: f64, angle_deg: f64) -> PoseFrame {
    let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.9); LANDMARK_COUNT];
    let phi = angle_deg.to_radians();
    landmarks[LEFT_ANKLE] = Landmark::new(0.75, 0.5, 0.9);
    landmarks[LEFT_SHOULDER] = Landmark::new(
        0.5 + 0.25 * phi.cos() as f32,
        0.5 + 0.25 * phi.sin() as f32,
        0.9,
    );
    landmarks[LEFT_WRIST].y = 0.8;
    landmarks[RIGHT_WRIST].y = 0.8;
    PoseFrame::new(ts, landmarks)
}

/// Upright body: straight (180°) but with the angle triple spread
/// vertically, so the horizontal check fails.
fn standing_frame(ts: f64) -> PoseFrame {
    let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.9); LANDMARK_COUNT];
    landmarks[LEFT_SHOULDER] = Landmark::new(0.5, 0.75, 0.9);
    landmarks[LEFT_ANKLE] = Landmark::new(0.5, 0.25, 0.9);
    landmarks[LEFT_WRIST].y = 0.8;
    landmarks[RIGHT_WRIST].y = 0.8;
    PoseFrame::new(ts, landmarks)
}

/// Horizontal body with wrists raised to shoulder and hip level.
fn collapsed_frame(ts: f64) -> PoseFrame {
    let mut frame = horizontal_frame(ts, 170.0);
    frame.landmarks[LEFT_WRIST].y = 0.52;
    frame.landmarks[RIGHT_WRIST].y = 0.52;
    frame
}

fn low_visibility_frame(ts: f64) -> PoseFrame {
    let mut frame = horizontal_frame(ts, 170.0);
    frame.landmarks[LEFT_SHOULDER].visibility = 0.2;
    frame.landmarks[RIGHT_SHOULDER].visibility = 0.2;
    frame
}

fn plank_session() -> SessionStateMachine {
    SessionStateMachine::new(ExerciseProfile::plank()).unwrap()
}

// ============================================================================
// Happy path
// ============================================================================

#[test]
fn test_clean_twenty_second_hold() {
    let mut session = plank_session();

    // 25 fps of good horizontal form for 20 seconds after the latch frame.
    let mut last = None;
    for i in 1..=501u32 {
        let ts = f64::from(i) * 0.04;
        last = Some(session.process_frame(&horizontal_frame(ts, 175.0)).unwrap());
    }

    let snap = last.unwrap();
    assert_eq!(snap.state, SessionState::Active);
    assert!(!snap.is_ended);
    assert!((snap.hold_seconds - 20.0).abs() < 1e-6);
    assert_eq!(snap.feedback_message, "Good form");
    assert!(session.report().is_none());
}

#[test]
fn test_ready_and_visible_timestamps_reach_the_report() {
    let mut session = plank_session();

    // Visible-but-slack frames first, then the latch, then a hold.
    session.process_frame(&horizontal_frame(0.2, 120.0)).unwrap();
    session.process_frame(&horizontal_frame(0.4, 120.0)).unwrap();
    session.process_frame(&horizontal_frame(0.6, 170.0)).unwrap();
    session.process_frame(&horizontal_frame(5.6, 170.0)).unwrap();
    session.end();

    let report = session.report().expect("report after end");
    assert_eq!(report.exercise, "plank");
    assert_eq!(report.visible_at, Some(0.2));
    assert_eq!(report.ready_at, Some(0.6));
    assert_eq!(report.ended_at, 5.6);
    assert!((report.total_hold_seconds - 5.0).abs() < 1e-9);
}

// ============================================================================
// Termination signals
// ============================================================================

#[test]
fn test_established_hold_ends_on_short_form_break() {
    let mut session = plank_session();

    // Bank 16 seconds of hold, past the recovery window.
    for i in 1..=401u32 {
        let ts = f64::from(i) * 0.04;
        session.process_frame(&horizontal_frame(ts, 175.0)).unwrap();
    }

    // Sag to 145° and stay there; the strict 1.5s tier applies.
    let mut end = None;
    for i in 402..=452u32 {
        let ts = f64::from(i) * 0.04;
        let snap = session.process_frame(&horizontal_frame(ts, 145.0)).unwrap();
        if snap.is_ended {
            end = Some((ts, snap));
            break;
        }
    }

    let (ended_ts, snap) = end.expect("session should end within 2s of sagging");
    assert_eq!(snap.end_reason, Some(EndReason::FormBreak));
    // Break started at t=16.08; the first frame past the 1.5s tolerance.
    assert!((ended_ts - 17.60).abs() < 1e-9);
    // Banked hold survives the break untouched.
    assert!((snap.hold_seconds - 16.0).abs() < 1e-6);

    let report = session.report().unwrap();
    assert_eq!(report.end_reason, EndReason::FormBreak);
    assert!((report.total_hold_seconds - 16.0).abs() < 1e-6);
}

#[test]
fn test_fresh_hold_gets_the_generous_break_tier() {
    let mut session = plank_session();

    // Only 5 seconds banked: a 145° sag is tolerated for 8 seconds.
    session.process_frame(&horizontal_frame(0.5, 175.0)).unwrap();
    session.process_frame(&horizontal_frame(5.5, 175.0)).unwrap();

    let snap = session.process_frame(&horizontal_frame(6.0, 145.0)).unwrap();
    assert!(!snap.is_ended);
    let snap = session.process_frame(&horizontal_frame(13.5, 145.0)).unwrap();
    assert!(!snap.is_ended);

    let snap = session.process_frame(&horizontal_frame(14.1, 145.0)).unwrap();
    assert!(snap.is_ended);
    assert_eq!(snap.end_reason, Some(EndReason::FormBreak));
}

#[test]
fn test_never_good_form_ends_after_first_rep_grace() {
    let mut session = plank_session();

    // Latch, then immediately lose form and never recover. With zero hold
    // the grace suppresses auto-end for 30s, then the long-running break
    // fires at once.
    session.process_frame(&horizontal_frame(0.1, 170.0)).unwrap();

    let mut end = None;
    for k in 1..=80u32 {
        let ts = 0.1 + f64::from(k) * 0.5;
        let snap = session.process_frame(&horizontal_frame(ts, 149.0)).unwrap();
        if snap.is_ended {
            end = Some((ts, snap));
            break;
        }
    }

    let (ended_ts, snap) = end.expect("grace expiry should end the session");
    assert_eq!(snap.end_reason, Some(EndReason::FormBreak));
    assert_eq!(snap.hold_seconds, 0.0);
    // First evaluated frame at or past ready + 30s.
    assert!((ended_ts - 30.1).abs() < 1e-9);
}

#[test]
fn test_collapse_ends_on_a_single_frame() {
    let mut session = plank_session();
    session.process_frame(&horizontal_frame(0.5, 170.0)).unwrap();
    session.process_frame(&horizontal_frame(3.0, 170.0)).unwrap();

    let snap = session.process_frame(&collapsed_frame(3.04)).unwrap();
    assert!(snap.is_ended);
    assert_eq!(snap.end_reason, Some(EndReason::Collapse));
    assert_eq!(snap.feedback_message, "Session ended: collapse detected");
}

#[test]
fn test_standing_up_after_established_hold() {
    let mut session = plank_session();

    // 16 seconds banked, then upright frames. Form stays straight, so this
    // is the stood-up signal, not a form break.
    for i in 1..=401u32 {
        let ts = f64::from(i) * 0.04;
        session.process_frame(&horizontal_frame(ts, 175.0)).unwrap();
    }

    let snap = session.process_frame(&standing_frame(16.5)).unwrap();
    assert!(!snap.is_ended);
    let snap = session.process_frame(&standing_frame(18.1)).unwrap();
    assert!(snap.is_ended);
    assert_eq!(snap.end_reason, Some(EndReason::StoodUp));
}

#[test]
fn test_inactivity_fires_when_stood_up_tolerates_longer() {
    // A profile that tolerates standing for longer than the inactivity
    // timeout: the idle clock wins.
    let profile = ExerciseProfile {
        stood_up_early_timeout: 30.0,
        ..ExerciseProfile::plank()
    };
    let mut session = SessionStateMachine::new(profile).unwrap();

    session.process_frame(&horizontal_frame(0.5, 170.0)).unwrap();
    session.process_frame(&horizontal_frame(1.0, 170.0)).unwrap();

    let mut end = None;
    for k in 1..=30u32 {
        let ts = 1.0 + f64::from(k) * 0.5;
        let snap = session.process_frame(&standing_frame(ts)).unwrap();
        if snap.is_ended {
            end = Some(snap);
            break;
        }
    }

    let snap = end.expect("idle clock should end the session");
    assert_eq!(snap.end_reason, Some(EndReason::Inactivity));
}

#[test]
fn test_max_duration_cap() {
    let mut session = plank_session();
    session.process_frame(&horizontal_frame(0.5, 175.0)).unwrap();

    let mut end = None;
    for k in 1..=301u32 {
        let ts = 0.5 + f64::from(k);
        let snap = session.process_frame(&horizontal_frame(ts, 175.0)).unwrap();
        if snap.is_ended {
            end = Some((ts, snap));
            break;
        }
    }

    let (ended_ts, snap) = end.expect("hard cap should end the session");
    assert_eq!(snap.end_reason, Some(EndReason::MaxDuration));
    assert!((ended_ts - 300.5).abs() < 1e-9);
    assert!((snap.hold_seconds - 300.0).abs() < 1e-6);
}

// ============================================================================
// Gating and feedback
// ============================================================================

#[test]
fn test_occluded_shoulders_name_the_group() {
    let mut session = plank_session();
    let snap = session.process_frame(&low_visibility_frame(0.1)).unwrap();
    assert_eq!(snap.state, SessionState::AwaitingVisibility);
    assert_eq!(
        snap.feedback_message,
        "Shoulders not visible — step into frame"
    );
}

#[test]
fn test_break_feedback_counts_down() {
    let mut session = plank_session();
    session.process_frame(&horizontal_frame(0.5, 175.0)).unwrap();
    session.process_frame(&horizontal_frame(2.5, 175.0)).unwrap();

    // Inside the break grace: gentle nudge only.
    let snap = session.process_frame(&horizontal_frame(3.0, 145.0)).unwrap();
    assert_eq!(snap.feedback_message, "Adjust your form");

    // Past it: explicit countdown toward the 8s tier limit.
    let snap = session.process_frame(&horizontal_frame(7.0, 145.0)).unwrap();
    assert_eq!(
        snap.feedback_message,
        "Get back into position — ending in 4s"
    );
}

#[test]
fn test_active_survives_missing_and_bad_frames() {
    let mut session = plank_session();
    session.process_frame(&horizontal_frame(0.5, 175.0)).unwrap();
    session.process_frame(&horizontal_frame(2.5, 175.0)).unwrap();

    // A long stretch of frames with the angle triple missing entirely:
    // feedback only, no state change, no end.
    for k in 1..=60u32 {
        let ts = 2.5 + f64::from(k);
        let truncated = PoseFrame::new(ts, vec![Landmark::new(0.5, 0.5, 0.9); 12]);
        let snap = session.process_frame(&truncated).unwrap();
        assert_eq!(snap.state, SessionState::Active);
        assert!((snap.hold_seconds - 2.0).abs() < 1e-9);
    }

    // A short sag, well inside tolerance, then recovery: the latch holds
    // and the timer resumes where it left off.
    session.process_frame(&horizontal_frame(63.0, 145.0)).unwrap();
    let snap = session.process_frame(&horizontal_frame(63.5, 175.0)).unwrap();
    assert_eq!(snap.state, SessionState::Active);
    assert!((snap.hold_seconds - 2.5).abs() < 1e-9);
}

#[test]
fn test_hold_timer_is_monotone() {
    let mut session = plank_session();
    let mut last_hold = 0.0f64;

    // A messy but ordered stream: slack, good, sagging, occluded, good.
    let angles = [120.0, 170.0, 175.0, 145.0, 145.0, 175.0, 149.0, 175.0];
    for (i, angle) in angles.iter().cycle().take(80).enumerate() {
        let ts = 0.1 + i as f64 * 0.2;
        let snap = session.process_frame(&horizontal_frame(ts, *angle)).unwrap();
        assert!(snap.hold_seconds >= last_hold, "hold went backwards");
        last_hold = snap.hold_seconds;
        if snap.is_ended {
            break;
        }
    }
    assert!(last_hold > 0.0);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_replay_is_deterministic() {
    let frames: Vec<PoseFrame> = (0..200u32)
        .map(|i| {
            let ts = 0.1 + f64::from(i) * 0.1;
            match i % 7 {
                0 => low_visibility_frame(ts),
                1 | 2 | 3 => horizontal_frame(ts, 172.0),
                4 => horizontal_frame(ts, 146.0),
                5 => PoseFrame::new(ts, vec![Landmark::new(0.5, 0.5, 0.9); 10]),
                _ => horizontal_frame(ts, 168.0),
            }
        })
        .collect();

    let run = |frames: &[PoseFrame]| -> Vec<String> {
        let mut session = plank_session();
        frames
            .iter()
            .map(|f| serde_json::to_string(&session.process_frame(f).unwrap()).unwrap())
            .collect()
    };

    assert_eq!(run(&frames), run(&frames));
}

#[test]
fn test_terminal_session_ignores_further_frames() {
    let mut session = plank_session();
    session.process_frame(&horizontal_frame(0.5, 170.0)).unwrap();
    session.process_frame(&horizontal_frame(2.0, 170.0)).unwrap();
    let last = session.process_frame(&collapsed_frame(2.5)).unwrap();
    assert!(last.is_ended);

    // Good frames after the end change nothing.
    for k in 1..=10u32 {
        let ts = 2.5 + f64::from(k);
        let snap = session.process_frame(&horizontal_frame(ts, 175.0)).unwrap();
        assert_eq!(snap, last);
    }
    assert_eq!(session.end(), last);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_announces_auto_ended_sessions() {
    let registry = SessionRegistry::new();
    let mut rx = registry.subscribe();
    let id = registry.create(ExerciseProfile::plank()).unwrap();

    registry.process_frame(id, &horizontal_frame(0.5, 170.0)).unwrap();
    registry.process_frame(id, &horizontal_frame(2.0, 170.0)).unwrap();
    let snap = registry.process_frame(id, &collapsed_frame(2.5)).unwrap();
    assert!(snap.is_ended);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.session_id, id);
    assert_eq!(event.report.end_reason, EndReason::Collapse);

    // Replayed frames on the dead session publish nothing further.
    registry.process_frame(id, &horizontal_frame(3.0, 170.0)).unwrap();
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_registry_drives_independent_sessions() {
    let registry = SessionRegistry::new();
    let a = registry.create(ExerciseProfile::plank()).unwrap();
    let b = registry.create(ExerciseProfile::side_plank()).unwrap();

    registry.process_frame(a, &horizontal_frame(0.5, 170.0)).unwrap();
    registry.process_frame(a, &horizontal_frame(3.5, 170.0)).unwrap();

    // Session b never latched; session a banked 3 seconds.
    let snap_a = registry.snapshot(a).unwrap();
    let snap_b = registry.snapshot(b).unwrap();
    assert!((snap_a.hold_seconds - 3.0).abs() < 1e-9);
    assert_eq!(snap_b.state, SessionState::AwaitingVisibility);
}
