//! Extraction rules.
//!
//! A rule is a string `"<css selector>[@<part>]"`. The part picks what to
//! take from each matched element: `text` (default), `html`, `href`, `src`,
//! or `attr:<name>`. Rules are compiled at use time inside synchronous
//! extraction code — `scraper::Html` is not `Send`, so parsed documents and
//! compiled selectors never cross an await point.

use folio_core::SourceError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// What to extract from a matched element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RulePart {
    Text,
    Html,
    Href,
    Src,
    Attr(String),
}

/// A compiled extraction rule.
pub struct Rule {
    raw: String,
    selector: Selector,
    part: RulePart,
}

impl Rule {
    /// Compile `"selector@part"`. An empty selector or unknown part is a
    /// [`SourceError::Rule`]; a selector scraper rejects is
    /// [`SourceError::Selector`].
    pub fn parse(raw: &str) -> Result<Self, SourceError> {
        let raw = raw.trim();
        let (sel_str, part) = match raw.rsplit_once('@') {
            None => (raw, RulePart::Text),
            Some((sel, part)) => {
                let part = match part.trim() {
                    "text" => RulePart::Text,
                    "html" => RulePart::Html,
                    "href" => RulePart::Href,
                    "src" => RulePart::Src,
                    p if p.starts_with("attr:") => {
                        let name = p["attr:".len()..].trim();
                        if name.is_empty() {
                            return Err(SourceError::Rule(raw.to_owned()));
                        }
                        RulePart::Attr(name.to_owned())
                    }
                    _ => return Err(SourceError::Rule(raw.to_owned())),
                };
                (sel, part)
            }
        };
        let sel_str = sel_str.trim();
        if sel_str.is_empty() {
            return Err(SourceError::Rule(raw.to_owned()));
        }
        let selector = Selector::parse(sel_str).map_err(|e| SourceError::Selector {
            selector: sel_str.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_owned(),
            selector,
            part,
        })
    }

    /// The original rule string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn part(&self) -> &RulePart {
        &self.part
    }

    /// All elements the selector matches under `root`.
    pub fn elements<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        root.select(&self.selector).collect()
    }

    /// First match under `root`, extracted.
    pub fn first_in(&self, root: ElementRef<'_>) -> Option<String> {
        root.select(&self.selector).find_map(|el| self.extract(&el))
    }

    /// First match in the whole document, extracted.
    pub fn first_in_doc(&self, doc: &Html) -> Option<String> {
        doc.select(&self.selector).find_map(|el| self.extract(&el))
    }

    /// Pull the rule's part out of one element. Empty strings count as no
    /// match.
    pub fn extract(&self, el: &ElementRef<'_>) -> Option<String> {
        let value = match &self.part {
            RulePart::Text => el.text().collect::<String>().trim().to_owned(),
            RulePart::Html => el.inner_html(),
            RulePart::Href => el.value().attr("href")?.trim().to_owned(),
            RulePart::Src => el.value().attr("src")?.trim().to_owned(),
            RulePart::Attr(name) => el.value().attr(name)?.trim().to_owned(),
        };
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Resolve `link` against the page it came from. Absolute links pass
/// through; unresolvable bases leave the link untouched.
pub fn resolve_url(base: &str, link: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(link)) {
        Ok(abs) => abs.into(),
        Err(_) => link.to_owned(),
    }
}
