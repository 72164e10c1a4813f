//! Cross-source keyword search.
//!
//! Queries every enabled book source concurrently (bounded) and forwards
//! each source's hits as one batch the moment that source finishes.
//! Per-source failures are logged and skipped; they never fail the search.

use folio_core::source::{BookSource, SearchBook};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::book;
use crate::fetch::Fetcher;

/// How many sources are queried at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Hits from one source.
#[derive(Clone, Debug)]
pub struct SearchBatch {
    pub origin: String,
    pub hits: Vec<SearchBook>,
}

/// Search `key` across `sources`, sending one [`SearchBatch`] per source
/// with hits into `tx`. Returns the total hit count.
pub async fn search_all(
    fetcher: &Fetcher,
    sources: Vec<BookSource>,
    key: &str,
    tx: &mpsc::Sender<SearchBatch>,
    concurrency: usize,
) -> usize {
    let concurrency = concurrency.max(1);
    futures::stream::iter(sources)
        .map(|source| async move {
            match book::search(fetcher, &source, key).await {
                Ok(hits) if !hits.is_empty() => {
                    debug!(origin = %source.origin, count = hits.len(), "source returned hits");
                    let count = hits.len();
                    let batch = SearchBatch {
                        origin: source.origin.clone(),
                        hits,
                    };
                    if tx.send(batch).await.is_err() {
                        // Client went away; stop counting.
                        return 0;
                    }
                    count
                }
                Ok(_) => {
                    debug!(origin = %source.origin, "source returned no hits");
                    0
                }
                Err(e) => {
                    warn!(origin = %source.origin, error = %e, "source search failed");
                    0
                }
            }
        })
        .buffer_unordered(concurrency)
        .fold(0, |total, n| async move { total + n })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::source::{ContentRule, SearchRule, TocRule};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(base: &str, name: &str) -> BookSource {
        BookSource {
            origin: base.to_owned(),
            name: name.into(),
            enabled: true,
            search_url: format!("{base}/search?q={{key}}"),
            user_agent: None,
            rule_search: SearchRule {
                list: "div.result".into(),
                name: "h3@text".into(),
                author: None,
                book_url: "a@href".into(),
            },
            rule_info: Default::default(),
            rule_toc: TocRule {
                list: "li".into(),
                title: "a@text".into(),
                chapter_url: "a@href".into(),
            },
            rule_content: ContentRule {
                content: "div.content@text".into(),
            },
        }
    }

    async fn mock_results(server: &MockServer, n: usize) {
        let body: String = (0..n)
            .map(|i| format!(r#"<div class="result"><h3>Book {i}</h3><a href="/b/{i}">x</a></div>"#))
            .collect();
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn aggregates_across_sources() {
        let a = MockServer::start().await;
        let b = MockServer::start().await;
        mock_results(&a, 2).await;
        mock_results(&b, 3).await;

        let fetcher = Fetcher::new().unwrap();
        let sources = vec![source_for(&a.uri(), "a"), source_for(&b.uri(), "b")];
        let (tx, mut rx) = mpsc::channel(16);

        let total = search_all(&fetcher, sources, "word", &tx, DEFAULT_CONCURRENCY).await;
        drop(tx);

        assert_eq!(total, 5);
        let mut batches = Vec::new();
        while let Some(batch) = rx.recv().await {
            batches.push(batch);
        }
        assert_eq!(batches.len(), 2);
        // One batch per origin, each self-consistent.
        for batch in &batches {
            assert!(batch.hits.iter().all(|h| h.origin == batch.origin));
        }
    }

    #[tokio::test]
    async fn failing_source_is_skipped() {
        let ok = MockServer::start().await;
        mock_results(&ok, 1).await;

        let fetcher = Fetcher::new().unwrap();
        let sources = vec![
            source_for("http://127.0.0.1:1", "dead"),
            source_for(&ok.uri(), "live"),
        ];
        let (tx, mut rx) = mpsc::channel(16);

        let total = search_all(&fetcher, sources, "word", &tx, 2).await;
        drop(tx);

        assert_eq!(total, 1);
        let batch = rx.recv().await.unwrap();
        assert_eq!(batch.hits.len(), 1);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn empty_source_list_yields_nothing() {
        let fetcher = Fetcher::new().unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let total = search_all(&fetcher, Vec::new(), "word", &tx, 4).await;
        drop(tx);
        assert_eq!(total, 0);
        assert!(rx.recv().await.is_none());
    }
}
