//! Listing page extractor
//!
//! Reads every listing item in document order. The source site lists the most
//! recently updated show first, and the poller relies on that ordering.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use super::{compile_selector, element_text, fetch_page, first_attr, first_text, ListingExtractor};
use crate::config::SelectorConfig;
use crate::errors::{SourceError, SourceResult};
use crate::models::Entry;
use crate::utils::resolve_url;

/// Compiled selectors for the listing page
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    container_css: String,
    container: Selector,
    item: Selector,
    title: Selector,
    episode: Selector,
    link: Selector,
    image: Selector,
    rating: Selector,
    genre: Selector,
}

impl ListingSelectors {
    pub fn from_config(config: &SelectorConfig) -> SourceResult<Self> {
        Ok(Self {
            container_css: config.listing_container.clone(),
            container: compile_selector(&config.listing_container)?,
            item: compile_selector(&config.listing_item)?,
            title: compile_selector(&config.title)?,
            episode: compile_selector(&config.episode)?,
            link: compile_selector(&config.link)?,
            image: compile_selector(&config.image)?,
            rating: compile_selector(&config.rating)?,
            genre: compile_selector(&config.genre)?,
        })
    }
}

/// Listing extractor backed by a plain HTTP fetch and CSS selectors
pub struct HtmlListingExtractor {
    client: Client,
    selectors: ListingSelectors,
}

impl HtmlListingExtractor {
    pub fn new(client: Client, selectors: ListingSelectors) -> Self {
        Self { client, selectors }
    }
}

#[async_trait]
impl ListingExtractor for HtmlListingExtractor {
    async fn try_extract(&self, url: &str) -> SourceResult<Vec<Entry>> {
        let page_url = Url::parse(url).map_err(|e| SourceError::invalid_url(url, e.to_string()))?;
        let body = fetch_page(&self.client, url).await?;
        let entries = parse_listing(&body, &page_url, &self.selectors)?;
        info!("Extracted {} entries from {}", entries.len(), url);
        Ok(entries)
    }
}

/// Parse a listing document into entries, dropping incomplete items.
///
/// A document without the listing container is an error, not an empty list,
/// so a changed or blocked page is distinguishable in the logs.
pub fn parse_listing(
    html: &str,
    page_url: &Url,
    selectors: &ListingSelectors,
) -> SourceResult<Vec<Entry>> {
    let document = Html::parse_document(html);

    if document.select(&selectors.container).next().is_none() {
        return Err(SourceError::missing_container(
            &selectors.container_css,
            page_url.as_str(),
        ));
    }

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for item in document.select(&selectors.item) {
        let title = first_text(item, &selectors.title);
        let episode = first_text(item, &selectors.episode);
        let link = first_attr(item, &selectors.link, "href").map(|href| resolve_url(page_url, &href));

        let (Some(title), Some(episode), Some(link)) = (title, episode, link) else {
            skipped += 1;
            continue;
        };
        let Some(mut entry) = Entry::new(&title, &episode, &link) else {
            skipped += 1;
            continue;
        };

        entry.image = first_attr(item, &selectors.image, "src").map(|src| resolve_url(page_url, &src));
        entry.rating = first_text(item, &selectors.rating);
        entry.genres = item
            .select(&selectors.genre)
            .map(element_text)
            .collect::<Vec<_>>()
            .join(", ");

        entries.push(entry);
    }

    if skipped > 0 {
        debug!("Skipped {} incomplete listing items on {}", skipped, page_url);
    }

    Ok(entries)
}
