//! Error type definitions for the anime notifier

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
///
/// Only used while wiring up the poller. A corrupt history file surfaces as
/// [`HistoryError`] directly, and delivery errors never leave the notifier.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Page retrieval errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Filesystem errors outside the history store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listing and detail page errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Page load exceeded the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Non-success response from the page
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    /// Transport level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The listing container never appeared in the document
    #[error("Listing container '{selector}' not found at {url}")]
    MissingContainer { selector: String, url: String },

    /// A configured CSS selector could not be parsed
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// The page URL could not be parsed
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// History store errors
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Reading or writing the history file failed
    #[error("History file IO failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The history file exists but does not hold a valid history mapping
    #[error("History file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the in-memory mapping failed
    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Webhook delivery errors
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The endpoint answered with a non-success status
    #[error("Webhook returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport level failure
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a missing container error
    pub fn missing_container<S: Into<String>, U: Into<String>>(selector: S, url: U) -> Self {
        Self::MissingContainer {
            selector: selector.into(),
            url: url.into(),
        }
    }

    /// Create an invalid selector error
    pub fn invalid_selector<S: Into<String>, M: Into<String>>(selector: S, message: M) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Map a reqwest error, keeping timeouts distinguishable
    pub fn from_request(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(url)
        } else {
            Self::Request(error)
        }
    }
}

impl HistoryError {
    /// Create an IO error bound to the history path
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
