//! In-memory source store, keyed by origin.
//!
//! Loaded from a JSON file at startup; read-mostly afterwards. Inserting a
//! source with an existing origin replaces it.

use std::path::Path;

use dashmap::DashMap;
use folio_core::source::{BookSource, RssSource};
use serde::{Deserialize, Serialize};

/// Errors from loading or validating source definitions.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse source file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("source {origin} rejected: {reason}")]
    Invalid { origin: String, reason: String },
}

/// On-disk source file shape.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SourceFile {
    #[serde(default)]
    pub book_sources: Vec<BookSource>,
    #[serde(default)]
    pub rss_sources: Vec<RssSource>,
}

/// The live source store.
#[derive(Default)]
pub struct SourceRegistry {
    books: DashMap<String, BookSource>,
    rss: DashMap<String, RssSource>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all sources from a JSON file. Returns how many were added.
    pub fn load_file(&self, path: &Path) -> Result<usize, LoadError> {
        let raw = std::fs::read_to_string(path)?;
        let file: SourceFile = serde_json::from_str(&raw)?;
        let mut added = 0;
        for src in file.book_sources {
            self.insert_book(src)?;
            added += 1;
        }
        for src in file.rss_sources {
            self.insert_rss(src)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn insert_book(&self, src: BookSource) -> Result<(), LoadError> {
        if src.origin.trim().is_empty() {
            return Err(LoadError::Invalid {
                origin: src.origin,
                reason: "empty origin".into(),
            });
        }
        if src.rule_search.list.trim().is_empty() {
            return Err(LoadError::Invalid {
                origin: src.origin,
                reason: "empty search list rule".into(),
            });
        }
        if !src.search_url.contains("{key}") {
            return Err(LoadError::Invalid {
                origin: src.origin,
                reason: "search_url has no {key} placeholder".into(),
            });
        }
        let _ = self.books.insert(src.origin.clone(), src);
        Ok(())
    }

    pub fn insert_rss(&self, src: RssSource) -> Result<(), LoadError> {
        if src.origin.trim().is_empty() {
            return Err(LoadError::Invalid {
                origin: src.origin,
                reason: "empty origin".into(),
            });
        }
        // No XML feed parser: every RSS source must carry a list rule.
        if src.rule_articles.list.trim().is_empty() {
            return Err(LoadError::Invalid {
                origin: src.origin,
                reason: "empty article list rule".into(),
            });
        }
        let _ = self.rss.insert(src.origin.clone(), src);
        Ok(())
    }

    pub fn get_book(&self, origin: &str) -> Option<BookSource> {
        self.books.get(origin).map(|s| s.clone())
    }

    pub fn get_rss(&self, origin: &str) -> Option<RssSource> {
        self.rss.get(origin).map(|s| s.clone())
    }

    /// All enabled book sources, for cross-source search.
    pub fn enabled_book_sources(&self) -> Vec<BookSource> {
        self.books
            .iter()
            .filter(|e| e.value().enabled)
            .map(|e| e.value().clone())
            .collect()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn rss_count(&self) -> usize {
        self.rss.len()
    }
}
