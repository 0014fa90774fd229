//! In-memory store of open sessions, keyed by user id.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

/// One open occupancy period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub start_time: DateTime<Utc>,
}

/// Maps each user to their open session.
///
/// A single mutex guards the whole map, so `open`, `close` and `list` never
/// interleave. The lock is never held across an await point.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session starting at `now`.
    ///
    /// An existing session for the same user is replaced, which resets its
    /// start time.
    pub fn open(&self, user_id: &str, now: DateTime<Utc>) -> Session {
        let session = Session {
            user_id: user_id.to_string(),
            start_time: now,
        };

        let previous = self
            .sessions
            .lock()
            .insert(user_id.to_string(), session.clone());
        if let Some(prev) = previous {
            debug!(user_id, previous_start = %prev.start_time, "session restarted");
        }
        session
    }

    /// Remove and return the user's session, or `None` if they have none.
    pub fn close(&self, user_id: &str) -> Option<Session> {
        self.sessions.lock().remove(user_id)
    }

    /// Look up a user's session without modifying the store.
    pub fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.lock().get(user_id).cloned()
    }

    /// Snapshot of every open session, oldest start first.
    ///
    /// Sessions that started at the same instant are ordered by user id.
    pub fn list(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self.sessions.lock().values().cloned().collect();
        sessions.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
