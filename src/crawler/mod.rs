//! Crawler module for paging through content sites
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry, backoff and identity rotation
//! - Per-site request pacing
//! - The per-site pagination state machine
//! - Overall run orchestration across sites

mod coordinator;
mod fetcher;
mod pagination;
mod scheduler;
mod site;

pub use coordinator::{analyze_run, resume_run, CrawlSummary, Orchestrator};
pub use fetcher::{build_http_client, Fetcher, RetryPolicy, UserAgentPool};
pub use pagination::{PaginationCrawler, SiteCrawlReport};
pub use scheduler::PolitenessGate;
pub use site::SiteConfig;

use crate::config::Config;
use crate::TallyError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl followed by analysis
///
/// This is the main entry point for a fresh run. It will:
/// 1. Build every configured site and the shared fetcher
/// 2. Crawl all sites until each one is exhausted, repeats or hits a limit
/// 3. Write the raw corpus
/// 4. Analyze the corpus and write the report, unless cancelled
///
/// # Example
///
/// ```no_run
/// use post_tally::config::load_config;
/// use post_tally::crawler::crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = crawl(config, CancellationToken::new()).await?;
/// println!("{} posts", summary.run.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config, cancel: CancellationToken) -> Result<CrawlSummary, TallyError> {
    let orchestrator = Orchestrator::new(config, cancel)?;
    let (summary, _) = orchestrator.run(true).await?;
    Ok(summary)
}
