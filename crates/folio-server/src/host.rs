//! Host service activation.
//!
//! The reader app keeps a companion service alive while any debug session
//! exists. Here that is a keepalive task: the first `ensure_running()`
//! spawns it, every later call only counts. The call happens on every
//! upgrade attempt, before route validation, matching the original
//! activation ordering.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::websocket::registry::SessionRegistry;

/// How often the keepalive task reports the session gauge.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// Idempotent activation handle for the hosting service.
pub struct HostService {
    sessions: Arc<SessionRegistry>,
    token: CancellationToken,
    running: AtomicBool,
    activations: AtomicU64,
}

impl HostService {
    pub fn new(sessions: Arc<SessionRegistry>, token: CancellationToken) -> Self {
        Self {
            sessions,
            token,
            running: AtomicBool::new(false),
            activations: AtomicU64::new(0),
        }
    }

    /// Activate the service. Always counts; only the first call spawns the
    /// keepalive task.
    pub fn ensure_running(&self) {
        let _ = self.activations.fetch_add(1, Ordering::Relaxed);
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("host service started");
        let sessions = self.sessions.clone();
        let token = self.token.clone();
        let _ = tokio::spawn(async move {
            let mut tick = tokio::time::interval(KEEPALIVE_INTERVAL);
            let _ = tick.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tick.tick() => {
                        debug!(active_sessions = sessions.count(), "host service alive");
                    }
                }
            }
            info!("host service stopped");
        });
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Total activation calls, one per upgrade attempt.
    pub fn activation_count(&self) -> u64 {
        self.activations.load(Ordering::Relaxed)
    }
}
