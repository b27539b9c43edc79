use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::retry::{RetryPolicy, ScrapeStrategy};
use super::session::BrowserSession;
use crate::config::{BrowserConfig, SelectorConfig};
use crate::error::ExtractionError;
use crate::transcript::normalize;

/// Read every transcript segment on the page into one normalized string
async fn harvest_segments(
    session: &mut dyn BrowserSession,
    selectors: &SelectorConfig,
) -> Result<String, ExtractionError> {
    let segments = session.find_elements(&selectors.transcript_segment).await?;

    let mut transcript = String::new();
    for segment in &segments {
        transcript.push_str(&segment.text().await?);
        transcript.push(' ');
    }

    debug!("Harvested {} transcript segments", segments.len());
    Ok(normalize(&transcript))
}

/// Opens the transcript panel through the "more actions" menu, then harvests it
struct OpenPanelStrategy<'a> {
    selectors: &'a SelectorConfig,
    panel_wait: Duration,
}

#[async_trait]
impl ScrapeStrategy for OpenPanelStrategy<'_> {
    fn name(&self) -> &'static str {
        "open transcript panel"
    }

    async fn scrape(&self, session: &mut dyn BrowserSession) -> Result<String, ExtractionError> {
        let menu_button = session.find_element(&self.selectors.more_actions_button).await?;
        menu_button.click().await?;

        let menu_items = session.find_elements(&self.selectors.menu_item).await?;
        for item in &menu_items {
            if item.text().await?.trim() == self.selectors.show_transcript_label {
                item.click().await?;
                break;
            }
        }

        session.wait(self.panel_wait).await;
        harvest_segments(session, self.selectors).await
    }
}

/// Harvests a panel that an earlier attempt already opened
struct HarvestOpenPanelStrategy<'a> {
    selectors: &'a SelectorConfig,
}

#[async_trait]
impl ScrapeStrategy for HarvestOpenPanelStrategy<'_> {
    fn name(&self) -> &'static str {
        "harvest open panel"
    }

    async fn scrape(&self, session: &mut dyn BrowserSession) -> Result<String, ExtractionError> {
        harvest_segments(session, self.selectors).await
    }
}

/// Extracts a video's transcript from its watch page
#[derive(Clone)]
pub struct TranscriptExtractor {
    config: Arc<BrowserConfig>,
    policy: RetryPolicy,
}

impl TranscriptExtractor {
    pub fn new(config: Arc<BrowserConfig>) -> Self {
        let policy = RetryPolicy::new(config.retry_attempts);
        Self { config, policy }
    }

    /// Navigate to the video and extract its transcript
    pub async fn extract(
        &self,
        session: &mut dyn BrowserSession,
        video_id: &str,
    ) -> Result<String, ExtractionError> {
        super::open_video(session, &self.config, video_id).await?;
        self.extract_loaded(session).await
    }

    /// Extract the transcript of the page the session is already on
    pub async fn extract_loaded(&self, session: &mut dyn BrowserSession) -> Result<String, ExtractionError> {
        let primary = OpenPanelStrategy {
            selectors: &self.config.selectors,
            panel_wait: self.config.transcript_wait(),
        };
        let fallback = HarvestOpenPanelStrategy {
            selectors: &self.config.selectors,
        };

        match self.policy.run(session, &primary, Some(&fallback)).await {
            Some(transcript) => {
                info!("📜 Extracted transcript ({} chars)", transcript.len());
                Ok(transcript)
            }
            None => Err(ExtractionError::Exhausted {
                field: "transcript",
                attempts: self.policy.attempts(),
            }),
        }
    }
}
