//! Outbound notifications for newly detected episodes
//!
//! Delivery is best effort: one attempt, no retry. [`Notifier::notify`]
//! converts every failure into [`DeliveryOutcome::Failed`] so the pipeline
//! keeps going.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::DeliveryResult;
use crate::models::Entry;

pub mod discord;

pub use discord::{build_message, DiscordWebhookNotifier, Embed, WebhookMessage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, entry: &Entry) -> DeliveryResult<()>;

    async fn notify(&self, entry: &Entry) -> DeliveryOutcome {
        match self.deliver(entry).await {
            Ok(()) => {
                info!(
                    "Notified '{}' episode {}",
                    entry.title(),
                    entry.episode()
                );
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                warn!(
                    "Failed to notify '{}' episode {}: {}",
                    entry.title(),
                    entry.episode(),
                    e
                );
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }
}
