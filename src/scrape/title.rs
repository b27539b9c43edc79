use async_trait::async_trait;
use std::sync::Arc;

use super::retry::{RetryPolicy, ScrapeStrategy};
use super::session::BrowserSession;
use crate::config::{BrowserConfig, SelectorConfig};
use crate::error::ExtractionError;

struct HeadingStrategy<'a> {
    selectors: &'a SelectorConfig,
}

#[async_trait]
impl ScrapeStrategy for HeadingStrategy<'_> {
    fn name(&self) -> &'static str {
        "video title"
    }

    async fn scrape(&self, session: &mut dyn BrowserSession) -> Result<String, ExtractionError> {
        let heading = session.find_element(&self.selectors.video_title).await?;
        Ok(heading.text().await?.trim().to_string())
    }
}

/// Extracts the title of the loaded watch page
#[derive(Clone)]
pub struct TitleExtractor {
    config: Arc<BrowserConfig>,
    policy: RetryPolicy,
}

impl TitleExtractor {
    pub fn new(config: Arc<BrowserConfig>) -> Self {
        let policy = RetryPolicy::new(config.retry_attempts);
        Self { config, policy }
    }

    pub async fn extract_loaded(&self, session: &mut dyn BrowserSession) -> Result<String, ExtractionError> {
        let strategy = HeadingStrategy {
            selectors: &self.config.selectors,
        };

        self.policy
            .run(session, &strategy, None)
            .await
            .ok_or(ExtractionError::Exhausted {
                field: "title",
                attempts: self.policy.attempts(),
            })
    }
}
