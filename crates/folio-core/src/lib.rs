//! Core domain types for the folio reader backend: sources, extraction
//! rules, debug log entries, and shared error types.

pub mod debug;
pub mod error;
pub mod ids;
pub mod source;
pub mod text;

pub use error::SourceError;
pub use ids::SessionId;
