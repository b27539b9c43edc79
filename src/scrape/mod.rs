//! Browser-driven extraction of per-video fields.
//!
//! Each field has its own extractor built on the shared [`RetryPolicy`].
//! [`VideoScraper`] loads a watch page once and runs every extractor on it.

pub mod channel;
pub mod chrome;
pub mod retry;
pub mod session;
pub mod title;
pub mod transcript;

pub use channel::ChannelThumbnailExtractor;
pub use chrome::ChromeLauncher;
pub use retry::{RetryPolicy, ScrapeStrategy};
pub use session::{BrowserSession, PageElement, SessionGuard, SessionLauncher};
pub use title::TitleExtractor;
pub use transcript::TranscriptExtractor;

use std::sync::Arc;
use tracing::debug;

use crate::config::BrowserConfig;
use crate::error::ExtractionError;

/// Navigate to a video's watch page and let dynamic content settle
pub async fn open_video(
    session: &mut dyn BrowserSession,
    config: &BrowserConfig,
    video_id: &str,
) -> Result<(), ExtractionError> {
    let url = config.video_url(video_id);
    debug!("Opening {}", url);
    session.navigate(&url).await?;
    session.wait(config.settle_wait()).await;
    Ok(())
}

/// Fields scraped from one watch page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub transcript: Result<String, ExtractionError>,
    pub channel_thumbnail: Result<String, ExtractionError>,
}

impl ExtractionResult {
    /// Every field failed for the same reason
    pub fn failed(error: ExtractionError) -> Self {
        Self {
            transcript: Err(error.clone()),
            channel_thumbnail: Err(error),
        }
    }
}

/// Runs all per-video extractors against one loaded page
#[derive(Clone)]
pub struct VideoScraper {
    config: Arc<BrowserConfig>,
    transcript: TranscriptExtractor,
    channel: ChannelThumbnailExtractor,
    title: TitleExtractor,
}

impl VideoScraper {
    pub fn new(config: BrowserConfig) -> Self {
        let config = Arc::new(config);
        Self {
            transcript: TranscriptExtractor::new(config.clone()),
            channel: ChannelThumbnailExtractor::new(config.clone()),
            title: TitleExtractor::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Load the video once, then extract the channel thumbnail and transcript
    pub async fn scrape(&self, session: &mut dyn BrowserSession, video_id: &str) -> ExtractionResult {
        if let Err(e) = open_video(session, &self.config, video_id).await {
            return ExtractionResult::failed(e);
        }

        let channel_thumbnail = self.channel.extract_loaded(session).await;
        let transcript = self.transcript.extract_loaded(session).await;

        ExtractionResult {
            transcript,
            channel_thumbnail,
        }
    }

    /// Load the video, then extract its title and transcript
    pub async fn scrape_for_digest(
        &self,
        session: &mut dyn BrowserSession,
        video_id: &str,
    ) -> (Result<String, ExtractionError>, Result<String, ExtractionError>) {
        if let Err(e) = open_video(session, &self.config, video_id).await {
            return (Err(e.clone()), Err(e));
        }

        let title = self.title.extract_loaded(session).await;
        let transcript = self.transcript.extract_loaded(session).await;
        (title, transcript)
    }
}
