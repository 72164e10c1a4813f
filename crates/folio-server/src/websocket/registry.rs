//! Live session table.
//!
//! The server exclusively owns each session's entry from upgrade to
//! disconnect; the host service and health endpoint only read counts.

use std::time::Instant;

use dashmap::DashMap;
use folio_core::SessionId;

use crate::routes::DebugRoute;

/// Metadata for one live session.
#[derive(Clone, Debug)]
pub struct SessionInfo {
    pub id: SessionId,
    pub route: DebugRoute,
    pub started: Instant,
}

/// All currently connected debug sessions.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionInfo>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session bound to `route`.
    pub fn register(&self, route: DebugRoute) -> SessionId {
        let id = SessionId::new();
        let _ = self.sessions.insert(
            id.clone(),
            SessionInfo {
                id: id.clone(),
                route,
                started: Instant::now(),
            },
        );
        id
    }

    pub fn unregister(&self, id: &SessionId) {
        let _ = self.sessions.remove(id);
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn count_for(&self, route: DebugRoute) -> usize {
        self.sessions.iter().filter(|e| e.route == route).count()
    }

    pub fn get(&self, id: &SessionId) -> Option<SessionInfo> {
        self.sessions.get(id).map(|e| e.clone())
    }
}
