//! Debug log entries streamed to WebSocket clients.
//!
//! Every pipeline stage emits a [`DebugEntry`] with a numeric state code;
//! clients key their UI off the code and render `msg` verbatim.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// A fetch or extraction stage failed; the run is over.
pub const STATE_ERROR: i32 = -1;
/// Search / article-list stage.
pub const STATE_SEARCH: i32 = 10;
/// Book info stage.
pub const STATE_INFO: i32 = 20;
/// Table-of-contents stage.
pub const STATE_TOC: i32 = 30;
/// Chapter / article content stage.
pub const STATE_CONTENT: i32 = 40;
/// Run completed successfully; final entry.
pub const STATE_DONE: i32 = 1000;

/// One timestamped log line from a debug run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DebugEntry {
    pub state: i32,
    pub msg: String,
    /// Local wall-clock time, `HH:MM:SS.mmm`.
    pub time: String,
}

impl DebugEntry {
    pub fn new(state: i32, msg: impl Into<String>) -> Self {
        Self {
            state,
            msg: msg.into(),
            time: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::new(STATE_ERROR, msg)
    }

    pub fn done(msg: impl Into<String>) -> Self {
        Self::new(STATE_DONE, msg)
    }

    /// Whether this entry ends the run (success or failure).
    pub fn is_terminal(&self) -> bool {
        self.state == STATE_ERROR || self.state == STATE_DONE
    }
}
