//! Search, scrape and summarize a batch of videos.
//!
//! One request moves through
//! `Start → ItemsDiscovered → SessionOpen → Extracting → SessionClosed → Summarizing → Done`.
//! Discovery failure ends the request (`Failed`). Anything that goes wrong
//! for a single video only empties that video's fields.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Config, TierConfig};
use crate::error::{DigestError, DiscoveryError};
use crate::llm::create_llm;
use crate::llm::summary::{SummaryContext, SummaryGenerator, SummaryResult};
use crate::scrape::{ChromeLauncher, ExtractionResult, SessionGuard, SessionLauncher, VideoScraper};
use crate::search::{DiscoveredItem, DurationTier, Language, SearchProvider, YouTubeSearch};
use crate::video_url::parse_video_id;

/// What the caller asked for
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub tier: DurationTier,
    pub language: Language,
}

/// One discovered video with its scraped and generated fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedResult {
    #[serde(flatten)]
    pub item: DiscoveredItem,
    pub channel_thumbnail: String,
    pub summary: String,
    pub keywords: Vec<String>,
}

/// Summary of a single video requested by URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoDigest {
    pub video_id: String,
    pub title: String,
    pub summary: String,
    pub keywords: Vec<String>,
}

/// Stages of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    ItemsDiscovered,
    SessionOpen,
    Extracting,
    SessionClosed,
    Summarizing,
    Done,
    Failed,
}

/// Results of a run plus how it got there
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub results: Vec<EnrichedResult>,
    pub stages: Vec<PipelineStage>,
    /// Videos that ended up with at least one empty field because of an error
    pub degraded: usize,
}

struct StageLog(Vec<PipelineStage>);

impl StageLog {
    fn enter(&mut self, stage: PipelineStage) {
        debug!("Pipeline stage: {:?}", stage);
        if self.0.last() != Some(&stage) {
            self.0.push(stage);
        }
    }
}

/// Per-video working state between the extraction and summary phases
struct WorkItem {
    item: DiscoveredItem,
    transcript: String,
    channel_thumbnail: String,
    degraded: bool,
}

/// The scrape-and-summarize orchestrator
pub struct Pipeline {
    search: Arc<dyn SearchProvider>,
    launcher: Arc<dyn SessionLauncher>,
    scraper: VideoScraper,
    summarizer: SummaryGenerator,
    tiers: TierConfig,
}

impl Pipeline {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        launcher: Arc<dyn SessionLauncher>,
        scraper: VideoScraper,
        summarizer: SummaryGenerator,
        tiers: TierConfig,
    ) -> Self {
        Self {
            search,
            launcher,
            scraper,
            summarizer,
            tiers,
        }
    }

    /// Wire the production collaborators: YouTube search, local Chromium and the configured LLM
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let search = YouTubeSearch::new(&config.search, &config.browser.video_base_url)?;
        let llm = create_llm(&config.llm)?;

        Ok(Self::new(
            Arc::new(search),
            Arc::new(ChromeLauncher::new(config.browser.headless)),
            VideoScraper::new(config.browser.clone()),
            SummaryGenerator::new(Arc::from(llm), config.llm.temperature),
            config.tiers.clone(),
        ))
    }

    /// Search, scrape and summarize; only discovery failures are returned as errors
    pub async fn run(&self, request: &SearchRequest) -> Result<Vec<EnrichedResult>, DiscoveryError> {
        self.run_with_report(request).await.map(|run| run.results)
    }

    pub async fn run_with_report(&self, request: &SearchRequest) -> Result<PipelineRun, DiscoveryError> {
        let start_time = Instant::now();
        let mut stages = StageLog(Vec::new());
        stages.enter(PipelineStage::Start);

        let limits = self.tiers.limits(request.tier);
        let budget = self.tiers.summary_budget(request.tier, &request.language);

        info!(
            "🚀 Searching {:?} ({} tier, {} results, budget {})",
            request.query, request.tier, limits.max_results, budget
        );

        let items = match self
            .search
            .search(&request.query, request.tier, limits.max_results)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                stages.enter(PipelineStage::Failed);
                warn!("❌ Discovery failed: {}", e);
                return Err(e);
            }
        };
        stages.enter(PipelineStage::ItemsDiscovered);

        let mut work = self.extract_all(items, &mut stages).await;

        stages.enter(PipelineStage::Summarizing);
        let mut results = Vec::with_capacity(work.len());
        for (index, entry) in work.iter_mut().enumerate() {
            let context = SummaryContext {
                query: &request.query,
                title: &entry.item.title,
            };
            let summary = match self
                .summarizer
                .summarize(&entry.transcript, budget, &request.language, context)
                .await
            {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("⚠️ Summary failed for video {} ({}): {}", index + 1, entry.item.video_id, e);
                    entry.degraded = true;
                    SummaryResult::default()
                }
            };

            results.push(EnrichedResult {
                item: entry.item.clone(),
                channel_thumbnail: std::mem::take(&mut entry.channel_thumbnail),
                summary: summary.summary,
                keywords: summary.keywords,
            });
        }

        stages.enter(PipelineStage::Done);
        let degraded = work.iter().filter(|entry| entry.degraded).count();
        info!(
            "🎉 Enriched {} videos in {:.2}s ({} degraded)",
            results.len(),
            start_time.elapsed().as_secs_f64(),
            degraded
        );

        Ok(PipelineRun {
            results,
            stages: stages.0,
            degraded,
        })
    }

    /// Scrape every item through one browser session, closing it before returning.
    ///
    /// If this future is dropped mid-extraction the guard releases the session.
    async fn extract_all(&self, items: Vec<DiscoveredItem>, stages: &mut StageLog) -> Vec<WorkItem> {
        let mut session = match self.launcher.launch().await {
            Ok(session) => {
                stages.enter(PipelineStage::SessionOpen);
                Ok(SessionGuard::new(session))
            }
            Err(e) => {
                warn!("⚠️ Could not open browser session, videos will have no transcripts: {}", e);
                Err(e)
            }
        };

        let mut work = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let extraction = match &mut session {
                Ok(guard) => {
                    stages.enter(PipelineStage::Extracting);
                    self.scraper.scrape(guard.session(), &item.video_id).await
                }
                Err(e) => ExtractionResult::failed(e.clone()),
            };
            work.push(Self::absorb_extraction(index, item, extraction));
        }

        if let Ok(guard) = &mut session {
            close_session(guard).await;
            stages.enter(PipelineStage::SessionClosed);
        }

        work
    }

    fn absorb_extraction(index: usize, item: DiscoveredItem, extraction: ExtractionResult) -> WorkItem {
        let mut degraded = false;

        let transcript = extraction.transcript.unwrap_or_else(|e| {
            warn!("⚠️ No transcript for video {} ({}): {}", index + 1, item.video_id, e);
            degraded = true;
            String::new()
        });

        let channel_thumbnail = extraction.channel_thumbnail.unwrap_or_else(|e| {
            warn!("⚠️ No channel thumbnail for video {} ({}): {}", index + 1, item.video_id, e);
            degraded = true;
            String::new()
        });

        WorkItem {
            item,
            transcript,
            channel_thumbnail,
            degraded,
        }
    }

    /// Summarize a single watch-page URL
    pub async fn digest(&self, url: &str, language: &Language) -> Result<VideoDigest, DigestError> {
        let video_id = parse_video_id(url).ok_or_else(|| DigestError::UnsupportedUrl(url.to_string()))?;
        info!("🚀 Digest for video {}", video_id);

        let (title, transcript) = match self.launcher.launch().await {
            Ok(session) => {
                let mut guard = SessionGuard::new(session);
                let scraped = self.scraper.scrape_for_digest(guard.session(), &video_id).await;
                close_session(&mut guard).await;
                scraped
            }
            Err(e) => (Err(e.clone()), Err(e)),
        };

        let title = title.unwrap_or_else(|e| {
            warn!("⚠️ No title for video {}: {}", video_id, e);
            String::new()
        });
        let transcript = transcript.unwrap_or_else(|e| {
            warn!("⚠️ No transcript for video {}: {}", video_id, e);
            String::new()
        });

        let context = SummaryContext {
            query: "",
            title: &title,
        };
        let summary = self
            .summarizer
            .summarize(&transcript, self.tiers.digest_budget(language), language, context)
            .await
            .unwrap_or_else(|e| {
                warn!("⚠️ Summary failed for video {}: {}", video_id, e);
                SummaryResult::default()
            });

        Ok(VideoDigest {
            video_id,
            title,
            summary: summary.summary,
            keywords: summary.keywords,
        })
    }
}

async fn close_session(guard: &mut SessionGuard) {
    if let Err(e) = guard.close().await {
        warn!("Failed to close browser session: {}", e);
    }
}
