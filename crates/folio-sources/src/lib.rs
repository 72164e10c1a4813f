//! Rule-driven source engine: the registry of configured sources, the CSS
//! rule interpreter, the HTTP fetcher, and the three pipeline drivers the
//! debug server streams from.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `registry` | In-memory source store, JSON file loading |
//! | `rule` | `"selector@part"` rule parsing and extraction |
//! | `fetch` | reqwest wrapper with timeout and UA override |
//! | `book` | search → info → toc → content pipeline |
//! | `rss` | article list → article content pipeline |
//! | `search` | concurrent multi-source keyword search |

pub mod book;
pub mod fetch;
pub mod registry;
pub mod rss;
pub mod rule;
pub mod search;

pub use fetch::{FetchedPage, Fetcher};
pub use registry::SourceRegistry;
