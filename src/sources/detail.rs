//! Detail page fetcher

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{compile_selector, fetch_page, first_attr, first_block, DetailFetcher};
use crate::config::SelectorConfig;
use crate::errors::{SourceError, SourceResult};
use crate::models::Detail;
use crate::utils::resolve_url;

#[derive(Debug, Clone)]
pub struct DetailSelectors {
    description: Selector,
    background_image: Selector,
}

impl DetailSelectors {
    pub fn from_config(config: &SelectorConfig) -> SourceResult<Self> {
        Ok(Self {
            description: compile_selector(&config.description)?,
            background_image: compile_selector(&config.background_image)?,
        })
    }
}

pub struct HtmlDetailFetcher {
    client: Client,
    selectors: DetailSelectors,
}

impl HtmlDetailFetcher {
    pub fn new(client: Client, selectors: DetailSelectors) -> Self {
        Self { client, selectors }
    }
}

#[async_trait]
impl DetailFetcher for HtmlDetailFetcher {
    async fn try_fetch_detail(&self, link: &str) -> SourceResult<Detail> {
        let page_url = Url::parse(link).map_err(|e| SourceError::invalid_url(link, e.to_string()))?;
        let body = fetch_page(&self.client, link).await?;
        let detail = parse_detail(&body, &page_url, &self.selectors);
        debug!(
            "Fetched detail for {} (description: {} chars, background: {})",
            link,
            detail.description.chars().count(),
            !detail.background_image.is_empty()
        );
        Ok(detail)
    }
}

/// Missing blocks are not errors here, they just leave the field empty
pub fn parse_detail(html: &str, page_url: &Url, selectors: &DetailSelectors) -> Detail {
    let document = Html::parse_document(html);
    let root = document.root_element();

    Detail {
        description: first_block(root, &selectors.description).unwrap_or_default(),
        background_image: first_attr(root, &selectors.background_image, "src")
            .map(|src| resolve_url(page_url, &src))
            .unwrap_or_default(),
    }
}
