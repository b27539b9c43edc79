//! In-memory stand-ins for the browser, search provider and LLM.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use video_tldr::config::{BrowserConfig, SelectorConfig, TierConfig};
use video_tldr::llm::{GenerationRequest, LLMProvider, LLMResponse};
use video_tldr::{
    BrowserSession, DiscoveredItem, DiscoveryError, DurationTier, ExtractionError, LlmError,
    PageElement, Pipeline, SearchProvider, SessionLauncher, SummaryGenerator, VideoScraper, LLM,
};

pub const BASE_URL: &str = "https://www.youtube.com/watch?v=";

/// A scripted watch page
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub title: String,
    pub transcript_lines: Vec<String>,
    pub channel_thumbnail: Option<String>,
    /// Every lookup on this page fails
    pub broken: bool,
    /// Navigation to this page fails
    pub unreachable: bool,
    /// Segments only become readable after the first harvest
    pub slow_panel: bool,
    /// Navigation to this page never completes
    pub hangs: bool,
}

impl FakePage {
    pub fn with_transcript(title: &str, lines: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            transcript_lines: lines.iter().map(|l| l.to_string()).collect(),
            channel_thumbnail: Some(format!("https://yt3.example/{}.jpg", title.replace(' ', "_"))),
            ..Self::default()
        }
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct BrowserState {
    pub pages: HashMap<String, FakePage>,
    pub current: Option<String>,
    pub menu_open: bool,
    pub panel_open: bool,
    pub harvests: usize,
    pub launches: usize,
    pub closes: usize,
    pub releases: usize,
    pub navigations: Vec<String>,
    pub waits: Vec<Duration>,
}

impl BrowserState {
    fn page(&self) -> Option<&FakePage> {
        self.current.as_ref().and_then(|url| self.pages.get(url))
    }

    fn check_page(&self) -> Result<&FakePage, ExtractionError> {
        match self.page() {
            Some(page) if page.broken => Err(ExtractionError::Browser("page crashed".to_string())),
            Some(page) => Ok(page),
            None => Err(ExtractionError::Browser("no page loaded".to_string())),
        }
    }
}

/// Shared handle to a fake browser; clones observe the same state
#[derive(Clone)]
pub struct FakeBrowser {
    pub state: Arc<Mutex<BrowserState>>,
    selectors: SelectorConfig,
    fail_launch: bool,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BrowserState::default())),
            selectors: SelectorConfig::default(),
            fail_launch: false,
        }
    }

    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::new()
        }
    }

    pub fn add_page(&self, video_id: &str, page: FakePage) {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(format!("{}{}", BASE_URL, video_id), page);
    }

    pub fn launches(&self) -> usize {
        self.state.lock().unwrap().launches
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn releases(&self) -> usize {
        self.state.lock().unwrap().releases
    }
}

#[async_trait]
impl SessionLauncher for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ExtractionError> {
        if self.fail_launch {
            return Err(ExtractionError::Launch("chrome not installed".to_string()));
        }
        self.state.lock().unwrap().launches += 1;
        Ok(Box::new(FakeSession {
            browser: self.clone(),
            closed: false,
        }))
    }
}

pub struct FakeSession {
    browser: FakeBrowser,
    closed: bool,
}

#[derive(Debug, Clone)]
enum ElementKind {
    MoreActions,
    MenuItem,
    Static,
}

struct FakeElement {
    state: Arc<Mutex<BrowserState>>,
    kind: ElementKind,
    text: String,
    attributes: HashMap<String, String>,
    transcript_label: String,
}

#[async_trait]
impl PageElement for FakeElement {
    async fn text(&self) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, ExtractionError> {
        Ok(self.attributes.get(name).cloned())
    }

    async fn click(&self) -> Result<(), ExtractionError> {
        let mut state = self.state.lock().unwrap();
        match self.kind {
            ElementKind::MoreActions => state.menu_open = true,
            ElementKind::MenuItem if self.text == self.transcript_label => state.panel_open = true,
            _ => {}
        }
        Ok(())
    }
}

impl FakeSession {
    fn element(&self, kind: ElementKind, text: &str, attributes: &[(&str, String)]) -> Box<dyn PageElement> {
        Box::new(FakeElement {
            state: self.browser.state.clone(),
            kind,
            text: text.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            transcript_label: self.browser.selectors.show_transcript_label.clone(),
        })
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ExtractionError> {
        let hangs = {
            let mut state = self.browser.state.lock().unwrap();
            state.navigations.push(url.to_string());
            state.pages.get(url).map_or(false, |page| page.hangs)
        };
        if hangs {
            std::future::pending::<()>().await;
        }

        let mut state = self.browser.state.lock().unwrap();
        state.menu_open = false;
        state.panel_open = false;
        state.harvests = 0;

        if state.pages.get(url).map_or(false, |page| page.unreachable) {
            state.current = None;
            return Err(ExtractionError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        state.current = Some(url.to_string());
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) {
        self.browser.state.lock().unwrap().waits.push(duration);
    }

    async fn find_element(&mut self, selector: &str) -> Result<Box<dyn PageElement>, ExtractionError> {
        let selectors = &self.browser.selectors;
        let (title, thumbnail) = {
            let state = self.browser.state.lock().unwrap();
            let page = state.check_page()?;
            (page.title.clone(), page.channel_thumbnail.clone())
        };

        let not_found = || ExtractionError::ElementNotFound {
            selector: selector.to_string(),
        };

        if selector == selectors.more_actions_button {
            Ok(self.element(ElementKind::MoreActions, "", &[]))
        } else if selector == selectors.channel_thumbnail {
            let src = thumbnail.ok_or_else(not_found)?;
            Ok(self.element(ElementKind::Static, "", &[("src", src)]))
        } else if selector == selectors.video_title && !title.is_empty() {
            Ok(self.element(ElementKind::Static, &title, &[]))
        } else {
            Err(not_found())
        }
    }

    async fn find_elements(&mut self, selector: &str) -> Result<Vec<Box<dyn PageElement>>, ExtractionError> {
        let selectors = self.browser.selectors.clone();
        let mut state = self.browser.state.lock().unwrap();
        let page = state.check_page()?.clone();

        if selector == selectors.menu_item {
            if !state.menu_open {
                return Ok(Vec::new());
            }
            drop(state);
            return Ok(vec![
                self.element(ElementKind::MenuItem, "Save", &[]),
                self.element(ElementKind::MenuItem, &selectors.show_transcript_label, &[]),
            ]);
        }

        if selector == selectors.transcript_segment {
            if !state.panel_open {
                return Ok(Vec::new());
            }
            state.harvests += 1;
            if page.slow_panel && state.harvests == 1 {
                return Ok(Vec::new());
            }
            drop(state);
            return Ok(page
                .transcript_lines
                .iter()
                .map(|line| self.element(ElementKind::Static, line, &[]))
                .collect());
        }

        Ok(Vec::new())
    }

    async fn close(&mut self) -> Result<(), ExtractionError> {
        if !self.closed {
            self.closed = true;
            self.browser.state.lock().unwrap().closes += 1;
        }
        Ok(())
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.browser.state.lock().unwrap().releases += 1;
        }
    }
}

/// Search provider returning a fixed list, or failing
pub struct FakeSearch {
    items: Option<Vec<DiscoveredItem>>,
    pub calls: Mutex<Vec<(String, DurationTier, u32)>>,
}

impl FakeSearch {
    pub fn returning(items: Vec<DiscoveredItem>) -> Arc<Self> {
        Arc::new(Self {
            items: Some(items),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            items: None,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(
        &self,
        query: &str,
        tier: DurationTier,
        max_results: u32,
    ) -> Result<Vec<DiscoveredItem>, DiscoveryError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), tier, max_results));
        match &self.items {
            Some(items) => Ok(items.iter().take(max_results as usize).cloned().collect()),
            None => Err(DiscoveryError::Status {
                status: 403,
                body: "quotaExceeded".to_string(),
            }),
        }
    }
}

/// LLM that summarizes by echoing the first transcript word.
///
/// Transcripts containing `overloaded` get a 503; transcripts containing
/// `rambling` get a reply without the expected labels.
#[derive(Default)]
pub struct FakeLlm {
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeLlm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn budgets(&self) -> Vec<u32> {
        self.requests.lock().unwrap().iter().map(|r| r.max_tokens).collect()
    }
}

fn transcript_of(request: &GenerationRequest) -> String {
    request
        .messages
        .last()
        .map(|m| m.content.rsplit(": ").next().unwrap_or_default().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl LLM for FakeLlm {
    async fn generate(&self, request: GenerationRequest) -> Result<LLMResponse, LlmError> {
        let transcript = transcript_of(&request);
        self.requests.lock().unwrap().push(request);

        if transcript.contains("overloaded") {
            return Err(LlmError::Status {
                provider: "OpenAI",
                status: 503,
                body: "overloaded".to_string(),
            });
        }
        if transcript.contains("rambling") {
            return Ok(LLMResponse {
                content: "Sure! Here is a summary of the video.".to_string(),
                tokens_used: None,
            });
        }

        let first = transcript.split_whitespace().next().unwrap_or("nothing");
        Ok(LLMResponse {
            content: format!("TLDR: all about {first}\nKeywords: {first}, video"),
            tokens_used: Some(12),
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }
}

pub fn item(video_id: &str, title: &str) -> DiscoveredItem {
    DiscoveredItem {
        video_id: video_id.to_string(),
        title: title.to_string(),
        channel_name: format!("{} channel", title),
        published_at: Utc.with_ymd_and_hms(2023, 1, 15, 12, 0, 0).unwrap(),
        video_thumbnail: format!("https://i.ytimg.com/vi/{}/default.jpg", video_id),
        link: format!("{}{}", BASE_URL, video_id),
    }
}

/// Browser settings with zero waits
pub fn fast_browser_config() -> BrowserConfig {
    BrowserConfig {
        settle_wait_ms: 0,
        transcript_wait_ms: 0,
        video_base_url: BASE_URL.to_string(),
        ..BrowserConfig::default()
    }
}

pub fn pipeline(search: Arc<FakeSearch>, browser: &FakeBrowser, llm: Arc<FakeLlm>) -> Pipeline {
    Pipeline::new(
        search,
        Arc::new(browser.clone()),
        VideoScraper::new(fast_browser_config()),
        SummaryGenerator::new(llm, 0.7),
        TierConfig::default(),
    )
}
