//! Post-Tally: a paginated site crawler and corpus analyzer
//!
//! This crate pages through the listing pages of a configured set of content
//! sites until each one runs out of new posts, collects the posts into a flat
//! corpus file, and computes text statistics (sentence and word counts and a
//! vocabulary frequency distribution) over the collected corpus.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Post-Tally operations
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Analysis error: {0}")]
    Analysis(String),
}

/// Configuration-specific errors
///
/// These are fatal at startup and never raised once a crawl is running.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}' for site {site}")]
    InvalidSelector { site: String, selector: String },
}

/// Errors produced by the fetcher
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// A single failed attempt (non-2xx status, network error, unreadable body).
    /// The fetcher retries these; callers only see them through `Terminal`.
    #[error("Transient failure fetching {url}: {reason}")]
    Transient { url: String, reason: String },

    /// Every attempt allowed by the retry policy failed
    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    Terminal {
        url: String,
        attempts: u32,
        last: String,
    },

    /// The run was cancelled while the request was in flight or waiting to retry
    #[error("Fetch of {url} cancelled")]
    Cancelled { url: String },
}

/// Errors raised by extraction strategies when a fetched document lacks the
/// structure they expect
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Missing {element} in {url}")]
    MissingElement { url: String, element: String },

    #[error("Unrecognised date '{value}' in {url}")]
    InvalidDate { url: String, value: String },

    #[error("Failed to parse feed {url}: {message}")]
    Feed { url: String, message: String },
}

/// Result type alias for Post-Tally operations
pub type Result<T> = std::result::Result<T, TallyError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

// Re-export commonly used types
pub use analysis::{Analyzer, CorpusAnalysis, StopWords};
pub use config::Config;
pub use crawler::{Fetcher, Orchestrator, PaginationCrawler, RetryPolicy};
pub use extract::{Article, Document, ExtractionStrategy};
pub use state::{CrawlOutcome, CrawlPhase};
pub use storage::{CrawlRun, PostRecord};
