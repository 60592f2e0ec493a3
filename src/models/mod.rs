use serde::{Deserialize, Serialize};

use crate::utils::strip_query;

/// One listing item scraped from the source page
///
/// `title`, `episode` and `link` identify the episode and can only be set
/// through [`Entry::new`], which refuses blank values. Everything else is
/// descriptive and may be filled in later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredEntry")]
pub struct Entry {
    title: String,
    episode: String,
    link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// Comma-joined genre names, possibly empty
    pub genres: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

/// Long-form detail read from an entry's own page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detail {
    pub description: String,
    pub background_image: String,
}

/// Wire shape of an entry in the history file, validated into [`Entry`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    episode: String,
    #[serde(default)]
    link: String,
    image: Option<String>,
    rating: Option<String>,
    #[serde(default)]
    genres: String,
    description: Option<String>,
    background_image: Option<String>,
}

impl TryFrom<StoredEntry> for Entry {
    type Error = String;

    fn try_from(stored: StoredEntry) -> Result<Self, Self::Error> {
        let mut entry = Entry::new(&stored.title, &stored.episode, &stored.link).ok_or_else(|| {
            format!(
                "entry requires title, episode and link (got title={:?}, episode={:?}, link={:?})",
                stored.title, stored.episode, stored.link
            )
        })?;
        entry.image = stored.image;
        entry.rating = stored.rating;
        entry.genres = stored.genres;
        entry.description = stored.description;
        entry.background_image = stored.background_image;
        Ok(entry)
    }
}

impl Entry {
    /// Build an entry, or `None` if any identifying field is blank
    pub fn new(title: &str, episode: &str, link: &str) -> Option<Self> {
        let (title, episode, link) = (title.trim(), episode.trim(), link.trim());
        if title.is_empty() || episode.is_empty() || link.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            episode: episode.to_string(),
            link: link.to_string(),
            image: None,
            rating: None,
            genres: String::new(),
            description: None,
            background_image: None,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn episode(&self) -> &str {
        &self.episode
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Link with any query string removed
    pub fn normalized_link(&self) -> &str {
        strip_query(&self.link)
    }

    /// Dedup rule: normalized link, title, episode and genres must all match
    pub fn is_same_episode(&self, other: &Entry) -> bool {
        self.normalized_link() == other.normalized_link()
            && self.title == other.title
            && self.episode == other.episode
            && self.genres == other.genres
    }

    /// Merge a fetched detail into this entry
    pub fn apply_detail(&mut self, detail: Detail) {
        self.description = Some(detail.description);
        self.background_image = Some(detail.background_image);
    }
}
