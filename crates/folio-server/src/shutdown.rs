//! Graceful shutdown via a shared `CancellationToken`.

use tokio_util::sync::CancellationToken;

/// Hands out cancellation tokens to the listener, the host service, and
/// every live session; cancelling once stops them all.
#[derive(Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }
}
