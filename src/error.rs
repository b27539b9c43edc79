//! Error kinds raised by the scrape-and-summarize pipeline.
//!
//! Only [`DiscoveryError`] ever reaches a caller. Extraction and summary
//! failures are recovered per item by the pipeline, which leaves the
//! affected fields at their empty defaults.

use thiserror::Error;

/// Search-provider failures. Fatal to the whole request.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("unknown video duration tier: {0}")]
    UnknownTier(String),

    #[error("search provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("search provider response could not be read: {0}")]
    InvalidResponse(String),

    #[error("search provider not configured: {0}")]
    NotConfigured(String),
}

/// Failures inside one item's browser extraction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("no element matches selector {selector}")]
    ElementNotFound { selector: String },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("{field} still empty after {attempts} attempts")]
    Exhausted { field: &'static str, attempts: usize },
}

/// Text-generation service failures (non-success status or transport).
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("no response from {0}")]
    EmptyResponse(&'static str),

    #[error("{0}")]
    NotConfigured(String),
}

/// Summary generation failures: either the service failed or its text
/// could not be parsed into summary + keywords.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("generation service error: {0}")]
    Generation(#[from] LlmError),

    #[error("response does not match the TLDR/Keywords format: {response:?}")]
    Format { response: String },
}

/// Failures of the single-video digest entry point.
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("video summary not supported for this url: {0}")]
    UnsupportedUrl(String),
}
