//! Wire protocol: inbound commands and outbound frames.
//!
//! Commands are single JSON text frames. Which fields are required depends
//! on the route:
//!
//! | Route | Command |
//! |-------|---------|
//! | `/bookSourceDebug` | `{"tag": <source origin>, "key": <search word>}` |
//! | `/rssSourceDebug`  | `{"tag": <source origin>}` |
//! | `/searchBook`      | `{"key": <search word>}` |

use folio_core::debug::DebugEntry;
use folio_core::source::SearchBook;
use folio_core::{SessionId, SourceError};
use serde::Deserialize;
use serde_json::json;

use crate::routes::DebugRoute;

#[derive(Debug, Default, Deserialize)]
struct RawCommand {
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    key: Option<String>,
}

/// A validated client command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    BookDebug { tag: String, key: String },
    RssDebug { tag: String },
    Search { key: String },
}

fn required(field: Option<String>, name: &str) -> Result<String, SourceError> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SourceError::InvalidCommand(format!("missing `{name}`"))),
    }
}

/// Parse and validate a command for `route`.
pub fn parse_command(route: DebugRoute, text: &str) -> Result<Command, SourceError> {
    let raw: RawCommand = serde_json::from_str(text)
        .map_err(|e| SourceError::InvalidCommand(format!("not a JSON command: {e}")))?;
    match route {
        DebugRoute::BookSourceDebug => Ok(Command::BookDebug {
            tag: required(raw.tag, "tag")?,
            key: required(raw.key, "key")?,
        }),
        DebugRoute::RssSourceDebug => Ok(Command::RssDebug {
            tag: required(raw.tag, "tag")?,
        }),
        DebugRoute::SearchBook => Ok(Command::Search {
            key: required(raw.key, "key")?,
        }),
    }
}

/// First frame on every session.
pub fn established_frame(id: &SessionId, route: DebugRoute) -> String {
    json!({
        "type": "connection.established",
        "route": route,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "data": { "sessionId": id },
    })
    .to_string()
}

/// A debug log entry, sent verbatim on the debug routes.
pub fn entry_frame(entry: &DebugEntry) -> String {
    serde_json::to_string(entry).unwrap_or_default()
}

/// One batch of search hits.
pub fn search_result_frame(hits: &[SearchBook]) -> String {
    json!({ "type": "searchResult", "data": hits }).to_string()
}

/// Terminal frame of a search run.
pub fn search_finish_frame(count: usize) -> String {
    json!({ "type": "searchFinish", "count": count }).to_string()
}
