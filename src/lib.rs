//! Video TLDR
//!
//! Searches for videos, scrapes their transcripts through a headless browser
//! and compresses each one into a budgeted summary with keywords.

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod scrape;
pub mod search;
pub mod transcript;
pub mod video_url;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::error::{DigestError, DiscoveryError, ExtractionError, LlmError, SummaryError};
pub use crate::llm::{create_llm, LLMConfig, LLMProvider, SummaryGenerator, SummaryResult, LLM};
pub use crate::pipeline::{EnrichedResult, Pipeline, PipelineStage, SearchRequest, VideoDigest};
pub use crate::scrape::{
    BrowserSession, PageElement, RetryPolicy, SessionGuard, SessionLauncher, VideoScraper,
};
pub use crate::search::{DiscoveredItem, DurationTier, Language, SearchProvider};
pub use crate::transcript::normalize;
