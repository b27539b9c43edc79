use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::llm::{LLMConfig, LLMProvider};
use crate::search::{DurationTier, Language};

/// Files searched, in order, when no path is given
pub const CONFIG_PATHS: [&str; 3] = [
    "video-tldr.toml",
    "config/video-tldr.toml",
    "/etc/video-tldr/config.toml",
];

/// Configuration for the video TLDR service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server and logging settings
    pub server: ServerConfig,

    /// Search-provider (YouTube Data API) settings
    pub search: SearchConfig,

    /// Headless browser scraping settings
    pub browser: BrowserConfig,

    /// Text-generation settings
    pub llm: LLMConfig,

    /// Result caps and summary budgets per duration tier
    pub tiers: TierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port the HTTP API listens on
    pub port: u16,

    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search endpoint of the YouTube Data API
    pub api_url: String,

    /// API key for the YouTube Data API
    pub api_key: Option<String>,

    /// Language hint passed as `relevanceLanguage`
    pub relevance_language: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Prefix that turns a video id into a watch page URL
    pub video_base_url: String,

    /// Run Chromium without a visible window
    pub headless: bool,

    /// Wait after navigation for the page to render (ms)
    pub settle_wait_ms: u64,

    /// Wait after opening the transcript panel (ms)
    pub transcript_wait_ms: u64,

    /// Attempts per scrape step
    pub retry_attempts: usize,

    /// Page selectors; these track the third-party markup and break when it changes
    pub selectors: SelectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Button that opens the "more actions" menu under the player
    pub more_actions_button: String,

    /// Entries of the "more actions" menu
    pub menu_item: String,

    /// Text of the menu entry that opens the transcript panel
    pub show_transcript_label: String,

    /// One line of the transcript panel
    pub transcript_segment: String,

    /// Channel avatar image
    pub channel_thumbnail: String,

    /// Attribute of the avatar holding the image URL
    pub channel_thumbnail_attribute: String,

    /// Video title heading
    pub video_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierLimits {
    /// Number of search results requested
    pub max_results: u32,

    /// Summary budget in tokens for baseline languages
    pub summary_budget: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Budget multiplier for languages that pack more meaning per token
    pub dense_language_multiplier: u32,

    /// Summary budget for a single-video digest
    pub digest_budget: u32,

    pub short: TierLimits,
    pub medium: TierLimits,
    pub long: TierLimits,
}

impl BrowserConfig {
    pub fn settle_wait(&self) -> Duration {
        Duration::from_millis(self.settle_wait_ms)
    }

    pub fn transcript_wait(&self) -> Duration {
        Duration::from_millis(self.transcript_wait_ms)
    }

    /// Watch page URL for a video id
    pub fn video_url(&self, video_id: &str) -> String {
        format!("{}{}", self.video_base_url, video_id)
    }
}

impl TierConfig {
    pub fn limits(&self, tier: DurationTier) -> &TierLimits {
        match tier {
            DurationTier::Short => &self.short,
            DurationTier::Medium => &self.medium,
            DurationTier::Long => &self.long,
        }
    }

    /// Summary budget for a tier in the requested output language
    pub fn summary_budget(&self, tier: DurationTier, language: &Language) -> u32 {
        self.scale_for_language(self.limits(tier).summary_budget, language)
    }

    /// Digest budget in the requested output language
    pub fn digest_budget(&self, language: &Language) -> u32 {
        self.scale_for_language(self.digest_budget, language)
    }

    fn scale_for_language(&self, budget: u32, language: &Language) -> u32 {
        if language.is_dense() {
            budget.saturating_mul(self.dense_language_multiplier)
        } else {
            budget
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply
    /// environment overrides (including a `.env` file if present)
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let mut config = Self::load_first(&CONFIG_PATHS)?.unwrap_or_default();
        config.apply_env();
        Ok(config)
    }

    /// Load the first of `paths` that exists.
    ///
    /// A file that exists but does not parse is an error, never skipped.
    pub fn load_first<P: AsRef<Path>>(paths: &[P]) -> Result<Option<Self>> {
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            let config = Self::load_from(path)?;
            tracing::info!("📄 Loaded configuration from: {}", path.display());
            return Ok(Some(config));
        }
        Ok(None)
    }

    /// Load configuration from a specific toml file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Override settings from process environment variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override settings from any key/value source
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(api_url) = lookup("YOUTUBE_DATA_API_URL") {
            self.search.api_url = api_url;
        }

        if let Some(api_key) = lookup("YOUTUBE_DATA_API_KEY") {
            self.search.api_key = Some(api_key);
        }

        if let Some(base_url) = lookup("YOUTUBE_URL") {
            self.browser.video_base_url = base_url;
        }

        if let Some(endpoint) = lookup("OPENAI_API_URL") {
            self.llm.endpoint = Some(endpoint);
        }

        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(api_key);
        }

        if let Some(headless) = lookup("VIDEO_TLDR_HEADLESS").and_then(|h| h.parse().ok()) {
            self.browser.headless = headless;
        }

        if let Some(log_level) = lookup("VIDEO_TLDR_LOG_LEVEL") {
            self.server.log_level = log_level;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(anyhow!("YouTube Data API key required (YOUTUBE_DATA_API_KEY)"));
        }

        if self.browser.retry_attempts == 0 {
            return Err(anyhow!("retry_attempts must be greater than 0"));
        }

        for tier in DurationTier::ALL {
            let limits = self.tiers.limits(tier);
            if limits.max_results == 0 {
                return Err(anyhow!("max_results for {} tier must be greater than 0", tier));
            }
            if limits.summary_budget == 0 {
                return Err(anyhow!("summary_budget for {} tier must be greater than 0", tier));
            }
        }

        if self.tiers.digest_budget == 0 || self.tiers.dense_language_multiplier == 0 {
            return Err(anyhow!("digest_budget and dense_language_multiplier must be greater than 0"));
        }

        match self.llm.provider {
            LLMProvider::OpenAI | LLMProvider::Gemini => {
                if self.llm.api_key.is_none() {
                    return Err(anyhow!("API key required for {:?} provider", self.llm.provider));
                }
            }
            LLMProvider::LMStudio => {
                if self.llm.endpoint.is_none() {
                    return Err(anyhow!("endpoint required for LMStudio provider"));
                }
            }
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Video TLDR Configuration:\n\
            - Port: {}\n\
            - Search API: {}\n\
            - Video base URL: {}\n\
            - LLM Provider: {:?} ({})\n\
            - Headless browser: {}\n\
            - Settle wait: {}ms",
            self.server.port,
            self.search.api_url,
            self.browser.video_base_url,
            self.llm.provider,
            self.llm.model,
            self.browser.headless,
            self.browser.settle_wait_ms,
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            log_level: "video_tldr=info,warn".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.googleapis.com/youtube/v3/search".to_string(),
            api_key: None,
            relevance_language: "en".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            video_base_url: "https://www.youtube.com/watch?v=".to_string(),
            headless: true,
            settle_wait_ms: 5000,
            transcript_wait_ms: 1000,
            retry_attempts: 2,
            selectors: SelectorConfig::default(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            more_actions_button: r#"[class="yt-spec-button-shape-next yt-spec-button-shape-next--tonal yt-spec-button-shape-next--mono yt-spec-button-shape-next--size-m yt-spec-button-shape-next--icon-button "]"#.to_string(),
            menu_item: r#"[class="style-scope ytd-menu-service-item-renderer"]"#.to_string(),
            show_transcript_label: "Show transcript".to_string(),
            transcript_segment: r#"[class="segment-text style-scope ytd-transcript-segment-renderer"]"#.to_string(),
            channel_thumbnail: r#"[id="img"]"#.to_string(),
            channel_thumbnail_attribute: "src".to_string(),
            video_title: "#title h1 yt-formatted-string".to_string(),
        }
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            dense_language_multiplier: 2,
            digest_budget: 256,
            short: TierLimits {
                max_results: 5,
                summary_budget: 200,
            },
            medium: TierLimits {
                max_results: 5,
                summary_budget: 300,
            },
            long: TierLimits {
                max_results: 3,
                summary_budget: 500,
            },
        }
    }
}
