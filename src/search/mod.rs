//! Video discovery: duration tiers, output language and the search-provider seam.

pub mod youtube;

pub use youtube::YouTubeSearch;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DiscoveryError;

/// Video length bucket used both as a search filter and to pick result
/// caps and summary budgets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DurationTier {
    /// Under 4 minutes
    Short,
    /// 4 to 20 minutes
    Medium,
    /// Over 20 minutes
    Long,
}

impl DurationTier {
    pub const ALL: [DurationTier; 3] = [DurationTier::Short, DurationTier::Medium, DurationTier::Long];

    /// Value of the `videoDuration` search filter
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationTier::Short => "short",
            DurationTier::Medium => "medium",
            DurationTier::Long => "long",
        }
    }
}

impl fmt::Display for DurationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationTier {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(DurationTier::Short),
            "medium" => Ok(DurationTier::Medium),
            "long" => Ok(DurationTier::Long),
            _ => Err(DiscoveryError::UnknownTier(s.to_string())),
        }
    }
}

/// Output language of a summary, as a short language code (`en`, `zh-TW`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    fn primary_subtag(&self) -> String {
        self.0
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    /// Languages whose scripts carry more meaning per token get larger budgets
    pub fn is_dense(&self) -> bool {
        matches!(self.primary_subtag().as_str(), "zh" | "ja" | "ko")
    }

    /// English name used in prompts; unknown codes pass through verbatim
    pub fn display_name(&self) -> String {
        let name = match self.primary_subtag().as_str() {
            "en" => "English",
            "zh" => "Chinese",
            "ja" => "Japanese",
            "ko" => "Korean",
            "es" => "Spanish",
            "fr" => "French",
            "de" => "German",
            "pt" => "Portuguese",
            "it" => "Italian",
            "ru" => "Russian",
            "hi" => "Hindi",
            "id" => "Indonesian",
            "ms" => "Malay",
            "vi" => "Vietnamese",
            "th" => "Thai",
            _ => return self.0.clone(),
        };
        name.to_string()
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::new("en")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One video returned by the search provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredItem {
    pub video_id: String,
    pub title: String,
    pub channel_name: String,
    pub published_at: DateTime<Utc>,
    pub video_thumbnail: String,
    pub link: String,
}

/// Source of ranked search results
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return at most `max_results` items for `query` within `tier`, best first
    async fn search(
        &self,
        query: &str,
        tier: DurationTier,
        max_results: u32,
    ) -> Result<Vec<DiscoveredItem>, DiscoveryError>;
}
