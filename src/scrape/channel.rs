use async_trait::async_trait;
use std::sync::Arc;

use super::retry::{RetryPolicy, ScrapeStrategy};
use super::session::BrowserSession;
use crate::config::{BrowserConfig, SelectorConfig};
use crate::error::ExtractionError;

struct AvatarStrategy<'a> {
    selectors: &'a SelectorConfig,
}

#[async_trait]
impl ScrapeStrategy for AvatarStrategy<'_> {
    fn name(&self) -> &'static str {
        "channel avatar"
    }

    async fn scrape(&self, session: &mut dyn BrowserSession) -> Result<String, ExtractionError> {
        let avatar = session.find_element(&self.selectors.channel_thumbnail).await?;
        Ok(avatar
            .attribute(&self.selectors.channel_thumbnail_attribute)
            .await?
            .unwrap_or_default())
    }
}

/// Extracts the channel avatar URL shown next to a video
#[derive(Clone)]
pub struct ChannelThumbnailExtractor {
    config: Arc<BrowserConfig>,
    policy: RetryPolicy,
}

impl ChannelThumbnailExtractor {
    pub fn new(config: Arc<BrowserConfig>) -> Self {
        let policy = RetryPolicy::new(config.retry_attempts);
        Self { config, policy }
    }

    pub async fn extract(
        &self,
        session: &mut dyn BrowserSession,
        video_id: &str,
    ) -> Result<String, ExtractionError> {
        super::open_video(session, &self.config, video_id).await?;
        self.extract_loaded(session).await
    }

    pub async fn extract_loaded(&self, session: &mut dyn BrowserSession) -> Result<String, ExtractionError> {
        let strategy = AvatarStrategy {
            selectors: &self.config.selectors,
        };

        self.policy
            .run(session, &strategy, None)
            .await
            .ok_or(ExtractionError::Exhausted {
                field: "channel thumbnail",
                attempts: self.policy.attempts(),
            })
    }
}
