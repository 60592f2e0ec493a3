//! Discord-compatible webhook embeds

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::Notifier;
use crate::errors::{DeliveryError, DeliveryResult};
use crate::models::Entry;

const MISSING_RATING: &str = "Chưa có";
const MISSING_GENRES: &str = "Không rõ";
const MISSING_DESCRIPTION: &str = "Không có gì.";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookMessage {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Embed {
    pub author: EmbedAuthor,
    pub title: String,
    pub url: String,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedImage {
    pub url: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Render one entry as a single-embed webhook message
pub fn build_message(entry: &Entry, source_name: &str, source_url: &str, color: u32) -> WebhookMessage {
    let rating = non_empty(entry.rating.as_deref()).unwrap_or(MISSING_RATING);
    let genres = non_empty(Some(entry.genres.as_str())).unwrap_or(MISSING_GENRES);
    let description = non_empty(entry.description.as_deref()).unwrap_or(MISSING_DESCRIPTION);

    let thumbnail = non_empty(entry.image.as_deref());
    let image = non_empty(entry.background_image.as_deref()).or(thumbnail);

    WebhookMessage {
        embeds: vec![Embed {
            author: EmbedAuthor {
                name: source_name.to_string(),
                url: source_url.to_string(),
            },
            title: format!("{} (Tập {})", entry.title(), entry.episode()),
            url: entry.link().to_string(),
            description: format!(
                "**Đánh giá:** {rating}\n**Thể loại:** {genres}\n\n**Giới thiệu:** {description}"
            ),
            color,
            image: image.map(|url| EmbedImage { url: url.to_string() }),
            thumbnail: thumbnail.map(|url| EmbedImage { url: url.to_string() }),
        }],
    }
}

pub struct DiscordWebhookNotifier {
    client: Client,
    webhook_url: String,
    source_name: String,
    source_url: String,
    color: u32,
}

impl DiscordWebhookNotifier {
    pub fn new(
        client: Client,
        webhook_url: String,
        source_name: String,
        source_url: String,
        color: u32,
    ) -> Self {
        Self {
            client,
            webhook_url,
            source_name,
            source_url,
            color,
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhookNotifier {
    async fn deliver(&self, entry: &Entry) -> DeliveryResult<()> {
        let message = build_message(entry, &self.source_name, &self.source_url, self.color);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Webhook accepted message with status {}", status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        let mut entry = Entry::new("Frieren", "12", "https://example.org/phim/frieren/").unwrap();
        entry.image = Some("https://cdn.example.org/thumb.jpg".to_string());
        entry.rating = Some("9.1".to_string());
        entry.genres = "Fantasy, Adventure".to_string();
        entry.description = Some("An elf mage.".to_string());
        entry.background_image = Some("https://cdn.example.org/bg.jpg".to_string());
        entry
    }

    #[test]
    fn test_builds_full_embed() {
        let message = build_message(&entry(), "Animevietsub", "https://example.org/anime-moi/", 0x1abc9c);
        let value = serde_json::to_value(&message).unwrap();
        let embed = &value["embeds"][0];

        assert_eq!(embed["author"]["name"], "Animevietsub");
        assert_eq!(embed["author"]["url"], "https://example.org/anime-moi/");
        assert_eq!(embed["title"], "Frieren (Tập 12)");
        assert_eq!(embed["url"], "https://example.org/phim/frieren/");
        assert_eq!(
            embed["description"],
            "**Đánh giá:** 9.1\n**Thể loại:** Fantasy, Adventure\n\n**Giới thiệu:** An elf mage."
        );
        assert_eq!(embed["color"], 1752220);
        assert_eq!(embed["image"]["url"], "https://cdn.example.org/bg.jpg");
        assert_eq!(embed["thumbnail"]["url"], "https://cdn.example.org/thumb.jpg");
    }

    #[test]
    fn test_placeholders_and_image_fallback() {
        let mut entry = entry();
        entry.rating = None;
        entry.genres = String::new();
        entry.description = Some(String::new());
        entry.background_image = Some(String::new());

        let message = build_message(&entry, "Animevietsub", "https://example.org/", 0x1abc9c);
        let embed = &message.embeds[0];

        assert_eq!(
            embed.description,
            "**Đánh giá:** Chưa có\n**Thể loại:** Không rõ\n\n**Giới thiệu:** Không có gì."
        );
        assert_eq!(embed.image.as_ref().unwrap().url, "https://cdn.example.org/thumb.jpg");
    }

    #[test]
    fn test_images_omitted_without_urls() {
        let entry = Entry::new("Frieren", "12", "https://example.org/phim/frieren/").unwrap();
        let value = serde_json::to_value(build_message(&entry, "A", "https://example.org/", 1)).unwrap();
        assert!(value["embeds"][0].get("image").is_none());
        assert!(value["embeds"][0].get("thumbnail").is_none());
    }
}
