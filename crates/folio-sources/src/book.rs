//! Book source pipeline: search → book info → table of contents → first
//! chapter content.
//!
//! [`debug_book_source`] drives the whole pipeline against one source and
//! streams [`DebugEntry`] lines into a channel; the synchronous `parse_*`
//! helpers do the rule work and are unit-tested against static HTML.

use folio_core::debug::{DebugEntry, STATE_CONTENT, STATE_INFO, STATE_SEARCH, STATE_TOC};
use folio_core::source::{BookSource, Chapter, SearchBook};
use folio_core::text::preview;
use folio_core::SourceError;
use scraper::Html;
use tokio::sync::mpsc;

use crate::fetch::Fetcher;
use crate::rule::{resolve_url, Rule, RulePart};

/// Byte budget for content previews in debug entries.
const PREVIEW_BYTES: usize = 400;

/// Fields pulled from the book info page.
#[derive(Clone, Debug, Default)]
pub struct BookInfo {
    pub name: Option<String>,
    pub author: Option<String>,
    pub intro: Option<String>,
    pub toc_url: Option<String>,
}

/// Substitute the URL-encoded search word into the source's template.
pub fn build_search_url(source: &BookSource, key: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
    source.search_url.replace("{key}", &encoded)
}

/// Run one search against one source.
pub async fn search(
    fetcher: &Fetcher,
    source: &BookSource,
    key: &str,
) -> Result<Vec<SearchBook>, SourceError> {
    let url = build_search_url(source, key);
    let page = fetcher.get(&url, source.user_agent.as_deref()).await?;
    parse_search_page(&page.body, &page.url, source)
}

/// Apply the search rules to a results page.
pub fn parse_search_page(
    body: &str,
    page_url: &str,
    source: &BookSource,
) -> Result<Vec<SearchBook>, SourceError> {
    let rules = &source.rule_search;
    let list = Rule::parse(&rules.list)?;
    let name = Rule::parse(&rules.name)?;
    let author = rules.author.as_deref().map(Rule::parse).transpose()?;
    let book_url = Rule::parse(&rules.book_url)?;

    let doc = Html::parse_document(body);
    let mut hits = Vec::new();
    for el in list.elements(doc.root_element()) {
        let Some(name) = name.first_in(el) else {
            continue;
        };
        let Some(link) = book_url.first_in(el) else {
            continue;
        };
        hits.push(SearchBook {
            name,
            author: author
                .as_ref()
                .and_then(|r| r.first_in(el))
                .unwrap_or_default(),
            book_url: resolve_url(page_url, &link),
            origin: source.origin.clone(),
            intro: None,
        });
    }
    Ok(hits)
}

/// Apply the info rules to a book page. All fields optional.
pub fn parse_info_page(body: &str, page_url: &str, source: &BookSource) -> Result<BookInfo, SourceError> {
    let rules = &source.rule_info;
    let doc = Html::parse_document(body);
    let mut info = BookInfo::default();
    if let Some(rule) = rules.name.as_deref() {
        info.name = Rule::parse(rule)?.first_in_doc(&doc);
    }
    if let Some(rule) = rules.author.as_deref() {
        info.author = Rule::parse(rule)?.first_in_doc(&doc);
    }
    if let Some(rule) = rules.intro.as_deref() {
        info.intro = Rule::parse(rule)?.first_in_doc(&doc);
    }
    if let Some(rule) = rules.toc_url.as_deref() {
        info.toc_url = Rule::parse(rule)?
            .first_in_doc(&doc)
            .map(|u| resolve_url(page_url, &u));
    }
    Ok(info)
}

/// Apply the toc rules to a contents page.
pub fn parse_toc_page(
    body: &str,
    page_url: &str,
    source: &BookSource,
) -> Result<Vec<Chapter>, SourceError> {
    let rules = &source.rule_toc;
    let list = Rule::parse(&rules.list)?;
    let title = Rule::parse(&rules.title)?;
    let chapter_url = Rule::parse(&rules.chapter_url)?;

    let doc = Html::parse_document(body);
    let mut chapters = Vec::new();
    for el in list.elements(doc.root_element()) {
        let (Some(title), Some(link)) = (title.first_in(el), chapter_url.first_in(el)) else {
            continue;
        };
        chapters.push(Chapter {
            title,
            url: resolve_url(page_url, &link),
        });
    }
    if chapters.is_empty() {
        return Err(SourceError::EmptyMatch {
            rule: rules.list.clone(),
            url: page_url.to_owned(),
        });
    }
    Ok(chapters)
}

/// Apply the content rule to a chapter page. An `@html` part is rendered to
/// plain text; everything else is joined as-is.
pub fn parse_content_page(
    body: &str,
    page_url: &str,
    source: &BookSource,
) -> Result<String, SourceError> {
    let rule = Rule::parse(&source.rule_content.content)?;
    let doc = Html::parse_document(body);
    let Some(raw) = rule.first_in_doc(&doc) else {
        return Err(SourceError::EmptyMatch {
            rule: source.rule_content.content.clone(),
            url: page_url.to_owned(),
        });
    };
    let text = if *rule.part() == RulePart::Html {
        html2text::from_read(raw.as_bytes(), 100).unwrap_or_default()
    } else {
        raw
    };
    Ok(text)
}

/// Fetch the first chapter's text.
pub async fn content(
    fetcher: &Fetcher,
    source: &BookSource,
    chapter_url: &str,
) -> Result<String, SourceError> {
    let page = fetcher.get(chapter_url, source.user_agent.as_deref()).await?;
    parse_content_page(&page.body, &page.url, source)
}

/// Run the full debug pipeline, streaming entries into `sink`.
///
/// Any stage failure emits a terminal error entry; success ends with a
/// state-1000 entry. Send failures mean the client is gone and end the run
/// silently.
pub async fn debug_book_source(
    fetcher: &Fetcher,
    source: &BookSource,
    key: &str,
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

    // Stage 1: search
    emit!(DebugEntry::new(
        STATE_SEARCH,
        format!("searching `{key}` via {}", source.name)
    ));
    let search_url = build_search_url(source, key);
    let page = check!(fetcher.get(&search_url, source.user_agent.as_deref()).await);
    emit!(DebugEntry::new(STATE_SEARCH, page.summary()));
    let hits = check!(parse_search_page(&page.body, &page.url, source));
    if hits.is_empty() {
        emit!(DebugEntry::error(format!(
            "no search results for `{key}` (list rule `{}`)",
            source.rule_search.list
        )));
        return;
    }
    let first = &hits[0];
    emit!(DebugEntry::new(
        STATE_SEARCH,
        format!("{} result(s); first: {} ({})", hits.len(), first.name, first.book_url)
    ));

    // Stage 2: book info
    emit!(DebugEntry::new(
        STATE_INFO,
        format!("fetching book info: {}", first.book_url)
    ));
    let page = check!(fetcher.get(&first.book_url, source.user_agent.as_deref()).await);
    emit!(DebugEntry::new(STATE_INFO, page.summary()));
    let info = check!(parse_info_page(&page.body, &page.url, source));
    if let Some(name) = &info.name {
        emit!(DebugEntry::new(STATE_INFO, format!("name: {name}")));
    }
    if let Some(author) = &info.author {
        emit!(DebugEntry::new(STATE_INFO, format!("author: {author}")));
    }
    if let Some(intro) = &info.intro {
        emit!(DebugEntry::new(
            STATE_INFO,
            format!("intro: {}", preview(intro, PREVIEW_BYTES))
        ));
    }
    let toc_url = info.toc_url.clone().unwrap_or_else(|| page.url.clone());

    // Stage 3: table of contents
    emit!(DebugEntry::new(STATE_TOC, format!("fetching toc: {toc_url}")));
    let page = check!(fetcher.get(&toc_url, source.user_agent.as_deref()).await);
    emit!(DebugEntry::new(STATE_TOC, page.summary()));
    let chapters = check!(parse_toc_page(&page.body, &page.url, source));
    let first_chapter = &chapters[0];
    emit!(DebugEntry::new(
        STATE_TOC,
        format!(
            "{} chapter(s); first: {} ({})",
            chapters.len(),
            first_chapter.title,
            first_chapter.url
        )
    ));

    // Stage 4: first chapter content
    let body = check!(content(fetcher, source, &first_chapter.url).await);
    emit!(DebugEntry::new(
        STATE_CONTENT,
        format!("content: {}", preview(&body, PREVIEW_BYTES))
    ));

    emit!(DebugEntry::done("book source debug finished"));
}
