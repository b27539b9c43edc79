use async_trait::async_trait;
use tracing::debug;

use super::session::BrowserSession;
use crate::error::ExtractionError;

/// One way of pulling a value out of the current page
#[async_trait]
pub trait ScrapeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn scrape(&self, session: &mut dyn BrowserSession) -> Result<String, ExtractionError>;
}

/// Bounded retry with an optional alternate strategy.
///
/// The first attempt always uses the primary strategy; later attempts use
/// the fallback when one is given. An error counts as an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: usize,
}

impl RetryPolicy {
    pub fn new(attempts: usize) -> Self {
        Self {
            attempts: attempts.max(1),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// First non-empty value produced, or `None` once the budget is spent
    pub async fn run(
        &self,
        session: &mut dyn BrowserSession,
        primary: &dyn ScrapeStrategy,
        fallback: Option<&dyn ScrapeStrategy>,
    ) -> Option<String> {
        for attempt in 1..=self.attempts {
            let strategy = match fallback {
                Some(fallback) if attempt > 1 => fallback,
                _ => primary,
            };

            match strategy.scrape(session).await {
                Ok(value) if !value.trim().is_empty() => return Some(value),
                Ok(_) => debug!("{} attempt {} came back empty", strategy.name(), attempt),
                Err(e) => debug!("{} attempt {} failed: {}", strategy.name(), attempt, e),
            }
        }
        None
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}
