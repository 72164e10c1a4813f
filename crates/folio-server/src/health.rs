//! `GET /health` response.

use std::time::Instant;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
    pub service_running: bool,
}

pub fn health_check(
    start_time: Instant,
    active_sessions: usize,
    service_running: bool,
) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        active_sessions,
        service_running,
    }
}
