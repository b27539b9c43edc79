//! Chromium-backed browser session over the DevTools protocol.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::session::{BrowserSession, PageElement, SessionLauncher};
use crate::error::ExtractionError;

fn browser_error(error: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Browser(error.to_string())
}

/// Launches a local Chromium for each session.
///
/// Requires Chromium or Google Chrome to be installed on the system.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    headless: bool,
}

impl ChromeLauncher {
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ExtractionError> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--lang=en-US")
            .window_size(1920, 1080);
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ExtractionError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ExtractionError::Launch(e.to_string()))?;

        // The handler drives the CDP connection and must be polled for the browser to respond
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(ExtractionError::Launch(e.to_string()));
            }
        };

        info!("🌐 Browser session opened (headless: {})", self.headless);
        Ok(Box::new(ChromeSession {
            page,
            process: Some(ChromeProcess {
                browser,
                handler_task,
            }),
        }))
    }
}

/// The browser process and the task polling its CDP connection
struct ChromeProcess {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromeProcess {
    async fn shutdown(mut self) -> Result<(), ExtractionError> {
        let result = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        result.map(|_| ()).map_err(browser_error)
    }
}

impl Drop for ChromeProcess {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

/// One Chromium instance with a single tab reused for every video.
///
/// `process` is `None` once the session has been closed or released.
pub struct ChromeSession {
    page: Page,
    process: Option<ChromeProcess>,
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ExtractionError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ExtractionError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    async fn find_element(&mut self, selector: &str) -> Result<Box<dyn PageElement>, ExtractionError> {
        let element = self.page.find_element(selector).await.map_err(|e| {
            debug!("find_element({}) failed: {}", selector, e);
            ExtractionError::ElementNotFound {
                selector: selector.to_string(),
            }
        })?;
        Ok(Box::new(ChromeElement(element)))
    }

    async fn find_elements(
        &mut self,
        selector: &str,
    ) -> Result<Vec<Box<dyn PageElement>>, ExtractionError> {
        let elements = self.page.find_elements(selector).await.map_err(browser_error)?;
        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromeElement(element)) as Box<dyn PageElement>)
            .collect())
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        let Some(process) = self.process.take() else {
            return Ok(());
        };

        let result = process.shutdown().await;
        info!("🌐 Browser session closed");
        result
    }

    fn release(&mut self) {
        let Some(process) = self.process.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(e) = process.shutdown().await {
                        warn!("Background browser shutdown failed: {}", e);
                    }
                });
            }
            // No runtime left to drive the close; dropping the Browser kills the child
            Err(_) => drop(process),
        }
    }
}

struct ChromeElement(Element);

#[async_trait]
impl PageElement for ChromeElement {
    async fn text(&self) -> Result<String, ExtractionError> {
        Ok(self.0.inner_text().await.map_err(browser_error)?.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, ExtractionError> {
        self.0.attribute(name).await.map_err(browser_error)
    }

    async fn click(&self) -> Result<(), ExtractionError> {
        self.0.click().await.map_err(browser_error)?;
        Ok(())
    }
}
