//! RSS source pipeline: article list → first article content.
//!
//! Sources are rule-driven (CSS selectors over the fetched page); there is
//! no XML feed parser, so a source must carry an article list rule.

use folio_core::debug::{DebugEntry, STATE_CONTENT, STATE_SEARCH};
use folio_core::source::{Article, RssSource};
use folio_core::text::preview;
use folio_core::SourceError;
use scraper::Html;
use tokio::sync::mpsc;

use crate::fetch::Fetcher;
use crate::rule::{resolve_url, Rule, RulePart};

const PREVIEW_BYTES: usize = 400;

/// Apply the article rules to the list page.
pub fn parse_article_list(
    body: &str,
    page_url: &str,
    source: &RssSource,
) -> Result<Vec<Article>, SourceError> {
    let rules = &source.rule_articles;
    let list = Rule::parse(&rules.list)?;
    let title = Rule::parse(&rules.title)?;
    let link = Rule::parse(&rules.link)?;
    let description = rules.description.as_deref().map(Rule::parse).transpose()?;

    let doc = Html::parse_document(body);
    let mut articles = Vec::new();
    for el in list.elements(doc.root_element()) {
        let (Some(title), Some(href)) = (title.first_in(el), link.first_in(el)) else {
            continue;
        };
        articles.push(Article {
            title,
            link: resolve_url(page_url, &href),
            description: description.as_ref().and_then(|r| r.first_in(el)),
        });
    }
    if articles.is_empty() {
        return Err(SourceError::EmptyMatch {
            rule: rules.list.clone(),
            url: page_url.to_owned(),
        });
    }
    Ok(articles)
}

/// Extract an article body. With no content rule the whole page is rendered
/// to text.
pub fn parse_article_content(
    body: &str,
    page_url: &str,
    source: &RssSource,
) -> Result<String, SourceError> {
    let Some(rule_str) = source.rule_content.as_deref() else {
        return Ok(html2text::from_read(body.as_bytes(), 100).unwrap_or_default());
    };
    let rule = Rule::parse(rule_str)?;
    let doc = Html::parse_document(body);
    let Some(raw) = rule.first_in_doc(&doc) else {
        return Err(SourceError::EmptyMatch {
            rule: rule_str.to_owned(),
            url: page_url.to_owned(),
        });
    };
    if *rule.part() == RulePart::Html {
        Ok(html2text::from_read(raw.as_bytes(), 100).unwrap_or_default())
    } else {
        Ok(raw)
    }
}

/// Fetch and parse the article list.
pub async fn articles(
    fetcher: &Fetcher,
    source: &RssSource,
) -> Result<Vec<Article>, SourceError> {
    let page = fetcher
        .get(&source.origin, source.user_agent.as_deref())
        .await?;
    parse_article_list(&page.body, &page.url, source)
}

/// Run the full RSS debug pipeline, streaming entries into `sink`.
pub async fn debug_rss_source(
    fetcher: &Fetcher,
    source: &RssSource,
    sink: &mpsc::Sender<DebugEntry>,
) {
    macro_rules! emit {
        ($entry:expr) => {
            if sink.send($entry).await.is_err() {
                return;
            }
        };
    }
    macro_rules! check {
        ($result:expr) => {
            match $result {
                Ok(v) => v,
                Err(e) => {
                    emit!(DebugEntry::error(e.to_string()));
                    return;
                }
            }
        };
    }

    emit!(DebugEntry::new(
        STATE_SEARCH,
        format!("fetching article list: {}", source.origin)
    ));
    let page = check!(
        fetcher
            .get(&source.origin, source.user_agent.as_deref())
            .await
    );
    emit!(DebugEntry::new(STATE_SEARCH, page.summary()));
    let articles = check!(parse_article_list(&page.body, &page.url, source));
    let first = &articles[0];
    emit!(DebugEntry::new(
        STATE_SEARCH,
        format!(
            "{} article(s); first: {} ({})",
            articles.len(),
            first.title,
            first.link
        )
    ));

    emit!(DebugEntry::new(
        STATE_CONTENT,
        format!("fetching article: {}", first.link)
    ));
    let page = check!(fetcher.get(&first.link, source.user_agent.as_deref()).await);
    emit!(DebugEntry::new(STATE_CONTENT, page.summary()));
    let body = check!(parse_article_content(&page.body, &page.url, source));
    emit!(DebugEntry::new(
        STATE_CONTENT,
        format!("content: {}", preview(&body, PREVIEW_BYTES))
    ));

    emit!(DebugEntry::done("rss source debug finished"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::debug::{STATE_DONE, STATE_ERROR};
    use folio_core::source::ArticleRule;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(origin: &str) -> RssSource {
        RssSource {
            origin: origin.to_owned(),
            name: "mock feed".into(),
            enabled: true,
            user_agent: None,
            rule_articles: ArticleRule {
                list: "div.item".into(),
                title: "h2@text".into(),
                link: "a@href".into(),
                description: Some("p.desc@text".into()),
            },
            rule_content: Some("div.body@text".into()),
        }
    }

    const LIST_PAGE: &str = r#"
        <div class="item"><h2>First Post</h2><a href="/post/1">x</a><p class="desc">about one</p></div>
        <div class="item"><h2>Second Post</h2><a href="/post/2">x</a></div>
    "#;
    const ARTICLE_PAGE: &str = r#"<div class="body">Something happened today.</div>"#;

    #[test]
    fn list_extraction() {
        let src = source_for("https://f.example/feed");
        let articles = parse_article_list(LIST_PAGE, "https://f.example/feed", &src).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "First Post");
        assert_eq!(articles[0].link, "https://f.example/post/1");
        assert_eq!(articles[0].description.as_deref(), Some("about one"));
        assert!(articles[1].description.is_none());
    }

    #[test]
    fn empty_list_is_error() {
        let src = source_for("https://f.example");
        let err = parse_article_list("<p>nope</p>", "https://f.example", &src).unwrap_err();
        assert!(matches!(err, SourceError::EmptyMatch { .. }));
    }

    #[test]
    fn content_with_rule() {
        let src = source_for("https://f.example");
        let body = parse_article_content(ARTICLE_PAGE, "https://f.example/post/1", &src).unwrap();
        assert_eq!(body, "Something happened today.");
    }

    #[test]
    fn content_without_rule_renders_page() {
        let mut src = source_for("https://f.example");
        src.rule_content = None;
        let body =
            parse_article_content("<h1>Title</h1><p>Para</p>", "https://f.example/p", &src)
                .unwrap();
        assert!(body.contains("Title"));
        assert!(body.contains("Para"));
    }

    #[tokio::test]
    async fn full_pipeline_ends_with_done() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LIST_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/post/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_PAGE))
            .mount(&server)
            .await;

        let src = source_for(&format!("{}/feed", server.uri()));
        let fetcher = Fetcher::new().unwrap();
        let (tx, mut rx) = mpsc::channel(64);

        debug_rss_source(&fetcher, &src, &tx).await;
        drop(tx);

        let mut entries = Vec::new();
        while let Some(e) = rx.recv().await {
            entries.push(e);
        }
        assert_eq!(entries.last().unwrap().state, STATE_DONE);
        assert!(entries
            .iter()
            .any(|e| e.msg.contains("Something happened today")));
    }

    #[tokio::test]
    async fn unreachable_feed_ends_with_error() {
        let src = source_for("http://127.0.0.1:1/feed");
        let fetcher = Fetcher::new().unwrap();
        let (tx, mut rx) = mpsc::channel(64);

        debug_rss_source(&fetcher, &src, &tx).await;
        drop(tx);

        let mut last = None;
        while let Some(e) = rx.recv().await {
            last = Some(e);
        }
        assert_eq!(last.unwrap().state, STATE_ERROR);
    }
}
