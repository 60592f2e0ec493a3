//! Page retrieval for the listing and detail pages
//!
//! Both scrapers share one HTTP client and the same failure policy: the
//! `try_*` methods report typed [`SourceError`]s, while the plain methods used
//! by the poller log the failure and fall back to an empty value.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Node, Selector};
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{SourceError, SourceResult};
use crate::models::{Detail, Entry};
use crate::utils::{collapse_lines, collapse_whitespace};

pub mod detail;
pub mod listing;

pub use detail::{DetailSelectors, HtmlDetailFetcher};
pub use listing::{HtmlListingExtractor, ListingSelectors};

/// Turns a listing URL into candidate entries, newest first
#[async_trait]
pub trait ListingExtractor: Send + Sync {
    async fn try_extract(&self, url: &str) -> SourceResult<Vec<Entry>>;

    /// Never fails: an unreachable or malformed page yields no entries
    async fn extract(&self, url: &str) -> Vec<Entry> {
        match self.try_extract(url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Listing extraction failed for {}: {}", url, e);
                Vec::new()
            }
        }
    }
}

/// Reads the description and background image of a single entry
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn try_fetch_detail(&self, link: &str) -> SourceResult<Detail>;

    /// Never fails: both fields are empty when the page cannot be read
    async fn fetch_detail(&self, link: &str) -> Detail {
        match self.try_fetch_detail(link).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!("Detail fetch failed for {}: {}", link, e);
                Detail::default()
            }
        }
    }
}

/// Build the shared client; `timeout` bounds each whole page load
pub fn build_http_client(timeout: Duration, user_agent: &str) -> SourceResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(SourceError::Request)
}

/// GET a page and return its body, treating non-2xx as an error
pub(crate) async fn fetch_page(client: &Client, url: &str) -> SourceResult<String> {
    debug!("Fetching page {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SourceError::from_request(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| SourceError::from_request(url, e))
}

pub(crate) fn compile_selector(css: &str) -> SourceResult<Selector> {
    Selector::parse(css).map_err(|e| SourceError::invalid_selector(css, format!("{e:?}")))
}

/// Elements that start on their own line when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Text of `element` with a newline for every `<br>` and block boundary
fn rendered_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_rendered(element, &mut out);
    out
}

fn push_rendered(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // Source newlines inside text are plain whitespace, as in rendered HTML
            Node::Text(text) => out.extend(
                text.chars()
                    .map(|c| if c.is_whitespace() { ' ' } else { c }),
            ),
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if matches!(name, "script" | "style" | "template") {
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                push_rendered(child, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Single-line text of an element, every break collapsed to one space
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&rendered_text(element))
}

/// Multi-line text of an element: one trimmed line per rendered line,
/// blank lines dropped
pub(crate) fn element_lines(element: ElementRef<'_>) -> String {
    collapse_lines(&rendered_text(element))
}

/// Text of the first match under `scope`, `None` when absent or blank
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Like [`first_text`] but keeps line breaks, for long-form blocks
pub(crate) fn first_block(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_lines)
        .filter(|text| !text.is_empty())
}

/// Attribute of the first match under `scope`, `None` when absent or blank
pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
