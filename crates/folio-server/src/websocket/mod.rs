//! WebSocket session handling: wire protocol, live-session table, and the
//! per-connection loop.

pub mod protocol;
pub mod registry;
pub mod session;
