//! Capabilities of a controlled browser session.
//!
//! The pipeline only talks to these traits, so a scripted fake can stand in
//! for Chromium in tests.

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::error::ExtractionError;

/// One element found on the current page
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Rendered text of the element
    async fn text(&self) -> Result<String, ExtractionError>;

    /// Value of an attribute, `None` when absent
    async fn attribute(&self, name: &str) -> Result<Option<String>, ExtractionError>;

    async fn click(&self) -> Result<(), ExtractionError>;
}

/// A live browser used to visit and scrape pages one after another
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), ExtractionError>;

    async fn wait(&mut self, duration: Duration);

    /// First element matching a CSS selector
    async fn find_element(&mut self, selector: &str) -> Result<Box<dyn PageElement>, ExtractionError>;

    /// Every element matching a CSS selector, possibly none
    async fn find_elements(
        &mut self,
        selector: &str,
    ) -> Result<Vec<Box<dyn PageElement>>, ExtractionError>;

    /// Release the browser. Must be safe to call more than once.
    async fn close(&mut self) -> Result<(), ExtractionError>;

    /// Start tearing the browser down without waiting; used when the session
    /// is dropped before `close` could run. A no-op once closed.
    fn release(&mut self);
}

/// Owns a launched session for the extraction phase.
///
/// Dropping the guard before [`SessionGuard::close`] completes, for example
/// when the request future is cancelled, releases the session synchronously.
pub struct SessionGuard {
    session: Box<dyn BrowserSession>,
    closed: bool,
}

impl SessionGuard {
    pub fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session,
            closed: false,
        }
    }

    pub fn session(&mut self) -> &mut dyn BrowserSession {
        &mut *self.session
    }

    /// Close the session; after this the guard no longer releases on drop
    pub async fn close(&mut self) -> Result<(), ExtractionError> {
        let result = self.session.close().await;
        self.closed = true;
        result
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Browser session dropped before close, releasing");
            self.session.release();
        }
    }
}

/// Opens new browser sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ExtractionError>;
}
