//! The fixed route table.
//!
//! Path dispatch is an enum-keyed exact match, so adding a route without
//! handling it everywhere is a compile error.

use std::fmt;

use serde::Serialize;

/// The three recognized debug routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DebugRoute {
    BookSourceDebug,
    RssSourceDebug,
    SearchBook,
}

impl DebugRoute {
    pub const ALL: [DebugRoute; 3] = [
        DebugRoute::BookSourceDebug,
        DebugRoute::RssSourceDebug,
        DebugRoute::SearchBook,
    ];

    /// Exact-match a request path. Anything not in the table is `None` and
    /// the upgrade is refused.
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/bookSourceDebug" => Some(Self::BookSourceDebug),
            "/rssSourceDebug" => Some(Self::RssSourceDebug),
            "/searchBook" => Some(Self::SearchBook),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::BookSourceDebug => "/bookSourceDebug",
            Self::RssSourceDebug => "/rssSourceDebug",
            Self::SearchBook => "/searchBook",
        }
    }
}

impl fmt::Display for DebugRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
