//! One polling cycle: listing -> dedup -> detail -> notify -> record
//!
//! Every step handles its own failures, so [`Poller::run_cycle`] always
//! returns to idle with a [`CycleOutcome`] describing what happened.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::errors::AppResult;
use crate::history::HistoryStore;
use crate::models::Entry;
use crate::notifier::{DeliveryOutcome, DiscordWebhookNotifier, Notifier};
use crate::sources::{
    build_http_client, DetailFetcher, DetailSelectors, HtmlDetailFetcher, HtmlListingExtractor,
    ListingExtractor, ListingSelectors,
};

pub mod scheduler;

pub use scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoChangeReason {
    /// The listing could not be read or had no complete items
    EmptyListing,
    /// The newest item is already in the history
    AlreadyKnown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    NoChange(NoChangeReason),
    NewEntry {
        entry: Entry,
        delivery: DeliveryOutcome,
        /// False when the history write failed; memory still holds the entry
        persisted: bool,
    },
}

pub struct Poller {
    source_url: String,
    listing: Arc<dyn ListingExtractor>,
    details: Arc<dyn DetailFetcher>,
    notifier: Arc<dyn Notifier>,
    history: HistoryStore,
}

impl Poller {
    pub fn new(
        source_url: String,
        listing: Arc<dyn ListingExtractor>,
        details: Arc<dyn DetailFetcher>,
        notifier: Arc<dyn Notifier>,
        history: HistoryStore,
    ) -> Self {
        Self {
            source_url,
            listing,
            details,
            notifier,
            history,
        }
    }

    /// Wire up the HTML scrapers and the webhook notifier from configuration
    pub fn from_config(config: &Config, history: HistoryStore) -> AppResult<Self> {
        let client = build_http_client(config.polling.page_timeout, &config.polling.user_agent)?;

        let listing = HtmlListingExtractor::new(
            client.clone(),
            ListingSelectors::from_config(&config.selectors)?,
        );
        let details = HtmlDetailFetcher::new(
            client.clone(),
            DetailSelectors::from_config(&config.selectors)?,
        );
        let notifier = DiscordWebhookNotifier::new(
            client,
            config.webhook.url.clone(),
            config.source.name.clone(),
            config.source.url.clone(),
            config.webhook.color,
        );

        Ok(Self::new(
            config.source.url.clone(),
            Arc::new(listing),
            Arc::new(details),
            Arc::new(notifier),
            history,
        ))
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let entries = self.listing.extract(&self.source_url).await;

        let Some(mut candidate) = entries.into_iter().next() else {
            debug!("No entries observable on {} this cycle", self.source_url);
            return CycleOutcome::NoChange(NoChangeReason::EmptyListing);
        };

        if self.history.is_known(&self.source_url, &candidate) {
            debug!(
                "Newest entry '{}' episode {} already notified",
                candidate.title(),
                candidate.episode()
            );
            return CycleOutcome::NoChange(NoChangeReason::AlreadyKnown);
        }

        info!(
            "New episode found: '{}' episode {} ({})",
            candidate.title(),
            candidate.episode(),
            candidate.link()
        );

        let detail = self.details.fetch_detail(candidate.link()).await;
        candidate.apply_detail(detail);

        // Recorded regardless of delivery so a failed webhook is not retried
        let delivery = self.notifier.notify(&candidate).await;

        let persisted = match self.history.append(&self.source_url, candidate.clone()) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "Failed to persist history to {}: {}",
                    self.history.path().display(),
                    e
                );
                false
            }
        };

        CycleOutcome::NewEntry {
            entry: candidate,
            delivery,
            persisted,
        }
    }
}
