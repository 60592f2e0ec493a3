use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Listing page to poll
    pub url: String,
    /// Name shown as the embed author
    #[serde(default = "default_source_name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default = "default_embed_color")]
    pub color: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval", with = "duration_serde::duration")]
    pub interval: Duration,
    /// Bounds every page load and webhook call
    #[serde(default = "default_page_timeout", with = "duration_serde::duration")]
    pub page_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

/// CSS selectors used against the listing and detail pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_listing_container")]
    pub listing_container: String,
    #[serde(default = "default_listing_item")]
    pub listing_item: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_episode")]
    pub episode: String,
    #[serde(default = "default_link")]
    pub link: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_rating")]
    pub rating: String,
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_background_image")]
    pub background_image: String,
}

fn default_source_name() -> String {
    DEFAULT_SOURCE_NAME.to_string()
}

fn default_embed_color() -> u32 {
    DEFAULT_EMBED_COLOR
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
}

fn default_page_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS)
}

fn default_user_agent() -> String {
    format!("anime-notifier/{}", env!("CARGO_PKG_VERSION"))
}

fn default_history_path() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_PATH)
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_listing_container() -> String {
    DEFAULT_LISTING_CONTAINER.to_string()
}
fn default_listing_item() -> String {
    DEFAULT_LISTING_ITEM.to_string()
}
fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
fn default_episode() -> String {
    DEFAULT_EPISODE.to_string()
}
fn default_link() -> String {
    DEFAULT_LINK.to_string()
}
fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}
fn default_rating() -> String {
    DEFAULT_RATING.to_string()
}
fn default_genre() -> String {
    DEFAULT_GENRE.to_string()
}
fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}
fn default_background_image() -> String {
    DEFAULT_BACKGROUND_IMAGE.to_string()
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            page_timeout: default_page_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            max_history: default_max_history(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_container: default_listing_container(),
            listing_item: default_listing_item(),
            title: default_title(),
            episode: default_episode(),
            link: default_link(),
            image: default_image(),
            rating: default_rating(),
            genre: default_genre(),
            description: default_description(),
            background_image: default_background_image(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                url: String::new(),
                name: default_source_name(),
            },
            webhook: WebhookConfig {
                url: String::new(),
                color: default_embed_color(),
            },
            polling: PollingConfig::default(),
            storage: StorageConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file, writing a default template first if it is missing.
    ///
    /// The template leaves both URLs blank, so a fresh install fails
    /// [`Config::validate`] until they are filled in.
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        if std::path::Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents).map_err(|e| {
                AppError::configuration(format!("Failed to parse {config_file}: {e}"))
            })
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config).map_err(|e| {
                AppError::configuration(format!("Failed to render default config: {e}"))
            })?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_http_url("source.url", &self.source.url)?;
        validate_http_url("webhook.url", &self.webhook.url)?;

        if self.storage.max_history == 0 {
            return Err(AppError::configuration(
                "storage.max_history must be at least 1",
            ));
        }
        if self.polling.interval.is_zero() {
            return Err(AppError::configuration(
                "polling.interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::configuration(format!("{field} is required")));
    }
    let parsed = Url::parse(value)
        .map_err(|e| AppError::configuration(format!("{field} '{value}' is invalid: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::configuration(format!(
            "{field} must use http or https, got '{other}'"
        ))),
    }
}
