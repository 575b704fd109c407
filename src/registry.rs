//! Concurrent session registry.
//!
//! Sessions are independent single-threaded machines; the registry gives a
//! transport layer (one task per live connection) shared, thread-safe access
//! to them and a broadcast channel announcing ended sessions to reporting
//! subscribers. No session shares mutable state with another.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::domain::{ExerciseProfile, FinalReport, PoseFrame, SessionId, SessionSnapshot};
use crate::session::{SessionStateMachine, TimestampPolicy};
use crate::{Result, SessionError};

/// Registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Soft cap on stored sessions; ended sessions are evicted to make room.
    pub max_sessions: usize,
    /// Broadcast channel capacity for ended-session events.
    pub broadcast_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: 256,
            broadcast_capacity: 1024,
        }
    }
}

/// Event published when a session reaches its terminal state.
#[derive(Debug, Clone)]
pub struct SessionEnded {
    /// The session that ended.
    pub session_id: SessionId,
    /// Its final report.
    pub report: FinalReport,
}

/// Shared, thread-safe collection of live sessions.
///
/// Cloning is cheap; all clones see the same sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<SessionStateMachine>>>>,
    ended_tx: broadcast::Sender<SessionEnded>,
    config: RegistryConfig,
}

impl SessionRegistry {
    /// Create a registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with custom configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        let (ended_tx, _) = broadcast::channel(config.broadcast_capacity);
        Self {
            inner: Arc::new(RegistryInner {
                sessions: RwLock::new(HashMap::new()),
                ended_tx,
                config,
            }),
        }
    }

    /// Create a session for the given profile and register it.
    pub fn create(&self, profile: ExerciseProfile) -> Result<SessionId> {
        self.create_with_policy(profile, TimestampPolicy::default())
    }

    /// Create a session with an explicit timestamp policy.
    pub fn create_with_policy(
        &self,
        profile: ExerciseProfile,
        policy: TimestampPolicy,
    ) -> Result<SessionId> {
        let machine = SessionStateMachine::with_policy(profile, policy)?;
        let id = machine.id();

        let mut sessions = self.inner.sessions.write();
        if sessions.len() >= self.inner.config.max_sessions {
            // Evict the oldest ended session, if one exists.
            let evictable = sessions
                .iter()
                .filter_map(|(id, s)| {
                    let guard = s.lock();
                    guard.report().map(|r| (*id, r.ended_at))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(id, _)| id);
            if let Some(old) = evictable {
                sessions.remove(&old);
                debug!(session = %old, "evicted ended session at capacity");
            }
        }
        sessions.insert(id, Arc::new(Mutex::new(machine)));
        info!(session = %id, "session registered");
        Ok(id)
    }

    /// Drive one session by one frame.
    ///
    /// Locks only the addressed session, so other sessions process frames in
    /// parallel. Publishes a [`SessionEnded`] event on the frame that
    /// terminates the session.
    pub fn process_frame(&self, id: SessionId, frame: &PoseFrame) -> Result<SessionSnapshot> {
        let session = self.get(id)?;
        let mut guard = session.lock();

        let was_ended = guard.state().is_terminal();
        let snapshot = guard.process_frame(frame)?;
        if snapshot.is_ended && !was_ended {
            self.publish_end(&guard);
        }
        Ok(snapshot)
    }

    /// Manually stop a session. Idempotent; the event is published once.
    pub fn end(&self, id: SessionId) -> Result<SessionSnapshot> {
        let session = self.get(id)?;
        let mut guard = session.lock();

        let was_ended = guard.state().is_terminal();
        let snapshot = guard.end();
        if !was_ended {
            self.publish_end(&guard);
        }
        Ok(snapshot)
    }

    /// Final report for a session, if it has ended.
    pub fn report(&self, id: SessionId) -> Result<Option<FinalReport>> {
        let session = self.get(id)?;
        let guard = session.lock();
        Ok(guard.report().cloned())
    }

    /// Last snapshot for a session without advancing it.
    pub fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot> {
        let session = self.get(id)?;
        let guard = session.lock();
        Ok(guard.snapshot().clone())
    }

    /// Drop a session from the registry.
    pub fn remove(&self, id: SessionId) -> Result<()> {
        self.inner
            .sessions
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::SessionNotFound(id))
    }

    /// Subscribe to ended-session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEnded> {
        self.inner.ended_tx.subscribe()
    }

    /// Number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.inner.sessions.read().len()
    }

    fn get(&self, id: SessionId) -> Result<Arc<Mutex<SessionStateMachine>>> {
        self.inner
            .sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or(SessionError::SessionNotFound(id))
    }

    fn publish_end(&self, session: &SessionStateMachine) {
        if let Some(report) = session.report() {
            // Ignore send errors (no subscribers).
            let _ = self.inner.ended_tx.send(SessionEnded {
                session_id: session.id(),
                report: report.clone(),
            });
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
