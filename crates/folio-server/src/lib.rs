//! Local debug WebSocket server for the folio reader backend.
//!
//! Exposes three upgrade paths on a configurable local port:
//! `/bookSourceDebug`, `/rssSourceDebug`, `/searchBook`. Every upgrade
//! attempt first activates the host service, then the path is exact-matched
//! against [`routes::DebugRoute`]; unknown paths refuse the upgrade.

pub mod config;
pub mod health;
pub mod host;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use routes::DebugRoute;
pub use server::DebugServer;
