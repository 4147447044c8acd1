//! Featured offers from the marketing site's WordPress REST API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use voyage_core::config::CmsConfig;
use voyage_core::{PassportError, PassportResult};

/// A featured offer as served to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedOffer {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub featured_image: String,
    pub offer_title: String,
    pub offer_subtitle: String,
    pub offer_type: String,
    pub offer_link: String,
}

/// WordPress REST client for the marketing site.
pub struct WordPressCms {
    http: reqwest::Client,
    base_url: String,
}

impl WordPressCms {
    pub fn new(config: &CmsConfig) -> PassportResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PassportError::Cms(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Latest featured offers, newest first, with featured images resolved.
    pub async fn featured_offers(&self) -> PassportResult<Vec<FeaturedOffer>> {
        let url = format!("{}/wp-json/wp/v2/featured-offers", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("per_page", "10"),
                ("orderby", "date"),
                ("order", "desc"),
                ("_embed", "true"),
            ])
            .send()
            .await
            .map_err(|e| PassportError::Cms(format!("featured offers fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PassportError::Cms(format!(
                "featured offers returned status {status}"
            )));
        }

        let raw: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| PassportError::Cms(format!("invalid featured offers response: {e}")))?;

        let mut offers = Vec::with_capacity(raw.len());
        for entry in &raw {
            let mut offer = parse_offer(entry);
            // Embedded media can be missing or an error object; fall back to
            // fetching the media record directly.
            if offer.featured_image.is_empty() {
                if let Some(media_id) = entry.get("featured_media").and_then(|v| v.as_u64()) {
                    if media_id != 0 {
                        match self.media_source_url(media_id).await {
                            Ok(Some(src)) => offer.featured_image = src,
                            Ok(None) => {}
                            Err(e) => warn!(media_id, error = %e, "Media lookup failed"),
                        }
                    }
                }
            }
            offers.push(offer);
        }

        debug!(count = offers.len(), "Fetched featured offers");
        Ok(offers)
    }

    async fn media_source_url(&self, media_id: u64) -> PassportResult<Option<String>> {
        let url = format!("{}/wp-json/wp/v2/media/{}", self.base_url, media_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| PassportError::Cms(format!("media fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let media: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PassportError::Cms(format!("invalid media response: {e}")))?;

        Ok(media
            .get("source_url")
            .and_then(|v| v.as_str())
            .map(String::from))
    }
}

fn parse_offer(entry: &serde_json::Value) -> FeaturedOffer {
    let rendered = |field: &str| {
        entry
            .get(field)
            .and_then(|v| v.get("rendered"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    let title = rendered("title");
    let acf = entry.get("acf");
    let acf_str = |field: &str| {
        acf.and_then(|a| a.get(field))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    let offer_title = {
        let explicit = acf_str("offer_title");
        if explicit.is_empty() {
            title.clone()
        } else {
            explicit
        }
    };

    FeaturedOffer {
        id: entry.get("id").and_then(|v| v.as_u64()).unwrap_or(0),
        featured_image: embedded_media_url(entry).unwrap_or_default(),
        content: rendered("content"),
        offer_title,
        offer_subtitle: acf_str("offer_subtitle"),
        offer_type: acf_str("offer_type"),
        offer_link: acf_str("offer_link"),
        title,
    }
}

/// Featured image out of the `_embedded` block: full-size rendition first,
/// then the media item's own source URL.
fn embedded_media_url(entry: &serde_json::Value) -> Option<String> {
    let media = entry
        .get("_embedded")?
        .get("wp:featuredmedia")?
        .as_array()?
        .first()?;

    if let Some(full) = media
        .get("media_details")
        .and_then(|d| d.get("sizes"))
        .and_then(|s| s.get("full"))
        .and_then(|f| f.get("source_url"))
        .and_then(|v| v.as_str())
    {
        return Some(full.to_string());
    }

    media
        .get("source_url")
        .and_then(|v| v.as_str())
        .map(String::from)
}
