//! Server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the debug server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (`0` auto-assigns).
    pub port: u16,
    /// Ping interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Close a session after this long without any client activity.
    pub heartbeat_timeout_secs: u64,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Outbound frame queue depth per session.
    pub send_queue: usize,
    /// How many book sources a cross-source search queries at once.
    pub search_concurrency: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 9099,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            max_message_size: 64 * 1024,
            send_queue: 256,
            search_concurrency: 8,
        }
    }
}
