//! Source definitions: a source is a base URL plus CSS-selector extraction
//! rules. Loaded from JSON, keyed by `origin`.

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// A rule-driven book site.
///
/// `search_url` contains a `{key}` placeholder replaced with the
/// URL-encoded search word.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookSource {
    /// Unique key, the site's base URL.
    pub origin: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Search page URL template with a `{key}` placeholder.
    pub search_url: String,
    /// Optional User-Agent override for this site.
    #[serde(default)]
    pub user_agent: Option<String>,
    pub rule_search: SearchRule,
    #[serde(default)]
    pub rule_info: InfoRule,
    pub rule_toc: TocRule,
    pub rule_content: ContentRule,
}

/// Rules applied to the search results page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRule {
    /// Selects one element per result.
    pub list: String,
    /// Applied within a result element.
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    /// Yields the book's info-page link (usually `a@href`).
    pub book_url: String,
}

/// Rules applied to the book info page. All optional; a source may carry
/// everything it needs on the search page.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InfoRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    /// Link to the table of contents when it lives on a separate page.
    #[serde(default)]
    pub toc_url: Option<String>,
}

/// Rules applied to the table-of-contents page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TocRule {
    pub list: String,
    pub title: String,
    pub chapter_url: String,
}

/// Rule applied to a chapter page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentRule {
    pub content: String,
}

/// A rule-driven article feed (an RSS-style source debugged over
/// `/rssSourceDebug`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RssSource {
    /// Unique key, the feed or list page URL.
    pub origin: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub rule_articles: ArticleRule,
    /// Rule for the article body; absent means whole-page text extraction.
    #[serde(default)]
    pub rule_content: Option<String>,
}

/// Rules applied to the article list page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArticleRule {
    pub list: String,
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One hit from a book search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchBook {
    pub name: String,
    #[serde(default)]
    pub author: String,
    pub book_url: String,
    /// Origin of the source that produced this hit.
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
}

/// One entry from a table of contents.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub url: String,
}

/// One entry from an article list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book_source_json() -> &'static str {
        r#"{
            "origin": "https://books.example",
            "name": "Example Books",
            "search_url": "https://books.example/search?q={key}",
            "rule_search": {
                "list": "div.result",
                "name": "h3@text",
                "author": "span.author@text",
                "book_url": "a@href"
            },
            "rule_toc": {
                "list": "ul.chapters li",
                "title": "a@text",
                "chapter_url": "a@href"
            },
            "rule_content": { "content": "div.content@html" }
        }"#
    }

    #[test]
    fn book_source_from_json() {
        let src: BookSource = serde_json::from_str(sample_book_source_json()).unwrap();
        assert_eq!(src.origin, "https://books.example");
        assert!(src.enabled, "enabled defaults to true");
        assert!(src.user_agent.is_none());
        assert_eq!(src.rule_search.list, "div.result");
        assert!(src.rule_info.intro.is_none(), "info rules default empty");
    }

    #[test]
    fn rss_source_minimal_json() {
        let src: RssSource = serde_json::from_str(
            r#"{
                "origin": "https://news.example/feed",
                "name": "Example News",
                "rule_articles": { "list": "article", "title": "h2@text", "link": "a@href" }
            }"#,
        )
        .unwrap();
        assert!(src.enabled);
        assert!(src.rule_content.is_none());
        assert!(src.rule_articles.description.is_none());
    }

    #[test]
    fn search_book_omits_empty_intro() {
        let hit = SearchBook {
            name: "n".into(),
            author: String::new(),
            book_url: "u".into(),
            origin: "o".into(),
            intro: None,
        };
        let json = serde_json::to_string(&hit).unwrap();
        assert!(!json.contains("intro"));
    }
}
