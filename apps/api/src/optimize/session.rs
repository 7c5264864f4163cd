//! Single-flight guard: at most one optimize call in flight per session.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

/// Session used when a request carries no `x-session-id` header.
pub const DEFAULT_SESSION: &str = "default";

#[derive(Clone, Default)]
pub struct SessionGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `session`, or returns `None` if it already has a call in flight.
    pub fn try_acquire(&self, session: &str) -> Option<SessionPermit> {
        if !self.lock().insert(session.to_string()) {
            debug!(session, "optimize already in flight");
            return None;
        }
        Some(SessionPermit {
            in_flight: Arc::clone(&self.in_flight),
            session: session.to_string(),
        })
    }

    pub fn is_busy(&self, session: &str) -> bool {
        self.lock().contains(session)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked.
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Releases the session when dropped.
pub struct SessionPermit {
    in_flight: Arc<Mutex<HashSet<String>>>,
    session: String,
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.session);
    }
}
