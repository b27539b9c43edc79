use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{DiscoveredItem, DurationTier, SearchProvider};
use crate::config::SearchConfig;
use crate::error::DiscoveryError;

/// YouTube Data API v3 search client
#[derive(Clone)]
pub struct YouTubeSearch {
    client: Client,
    api_url: String,
    api_key: String,
    relevance_language: String,
    video_base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    channel_title: String,
    published_at: DateTime<Utc>,
    title: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl YouTubeSearch {
    /// Create a client from configuration; `video_base_url` builds each item's link
    pub fn new(config: &SearchConfig, video_base_url: &str) -> Result<Self, DiscoveryError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DiscoveryError::NotConfigured("YouTube Data API key missing".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            relevance_language: config.relevance_language.clone(),
            video_base_url: video_base_url.to_string(),
        })
    }

    fn discovered_item(&self, item: SearchItem) -> Option<DiscoveredItem> {
        let video_id = item.id.video_id?;
        Some(DiscoveredItem {
            link: format!("{}{}", self.video_base_url, video_id),
            video_id,
            title: item.snippet.title,
            channel_name: item.snippet.channel_title,
            published_at: item.snippet.published_at,
            video_thumbnail: item
                .snippet
                .thumbnails
                .default
                .map(|t| t.url)
                .unwrap_or_default(),
        })
    }
}

#[async_trait]
impl SearchProvider for YouTubeSearch {
    async fn search(
        &self,
        query: &str,
        tier: DurationTier,
        max_results: u32,
    ) -> Result<Vec<DiscoveredItem>, DiscoveryError> {
        debug!("Searching YouTube for {:?} ({} tier, max {})", query, tier, max_results);

        let max_results = max_results.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("part", "snippet"),
                ("q", query),
                ("videoDuration", tier.as_str()),
                ("type", "video"),
                ("order", "viewCount"),
                ("relevanceLanguage", self.relevance_language.as_str()),
                ("videoCaption", "closedCaption"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::Status { status, body });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| DiscoveryError::InvalidResponse(e.to_string()))?;

        let total = parsed.items.len();
        let items: Vec<DiscoveredItem> = parsed
            .items
            .into_iter()
            .filter_map(|item| self.discovered_item(item))
            .collect();

        if items.len() < total {
            warn!("Skipped {} search results without a video id", total - items.len());
        }
        info!("🔍 Discovered {} videos for {:?}", items.len(), query);

        Ok(items)
    }
}
