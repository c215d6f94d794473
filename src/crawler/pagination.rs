//! Pagination crawler - pages through one site's listing pages
//!
//! The crawl of a site is a small state machine:
//!
//! ```text
//! AdvancingPage -> FetchingListing -> ExtractingArticles -> FetchingArticles -> PageComplete
//!       ^                                                                           |
//!       +---------------------------------------------------------------------------+
//! ```
//!
//! It stops when a listing page is empty, when a page repeats the previous
//! one (sites that clamp out-of-range page indices to their last page), when
//! the page ceiling is hit, when a listing page cannot be fetched or parsed,
//! when too many consecutive pages fail entirely, or on cancellation. In every
//! case the records collected so far are returned.

use crate::config::{CrawlerConfig, PageComparison};
use crate::crawler::scheduler::PolitenessGate;
use crate::crawler::site::SiteConfig;
use crate::crawler::Fetcher;
use crate::extract::Article;
use crate::state::{CrawlOutcome, CrawlPhase};
use crate::storage::PostRecord;
use crate::{FetchError, TallyError};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Everything one site crawl produced
#[derive(Debug, Clone)]
pub struct SiteCrawlReport {
    pub site: String,
    /// Records in page order, articles in listing order within a page
    pub records: Vec<PostRecord>,
    pub outcome: CrawlOutcome,
    /// Listing pages fetched and read, including the one that ended the crawl
    pub pages_crawled: u32,
    pub articles_attempted: usize,
    pub articles_failed: usize,
}

/// Result of processing the articles of one listing page
#[derive(Debug, Default)]
struct PageHarvest {
    records: Vec<PostRecord>,
    attempted: usize,
    failed: usize,
}

impl PageHarvest {
    /// Every attempted article failed
    fn all_failed(&self) -> bool {
        self.attempted > 0 && self.records.is_empty()
    }
}

#[derive(Debug, Default)]
struct Progress {
    records: Vec<PostRecord>,
    pages_crawled: u32,
    articles_attempted: usize,
    articles_failed: usize,
}

/// Drives the listing pages of one site
pub struct PaginationCrawler<'a> {
    site: &'a SiteConfig,
    fetcher: &'a Fetcher,
    settings: CrawlerConfig,
    gate: PolitenessGate,
    cancel: CancellationToken,
    phase: CrawlPhase,
}

impl<'a> PaginationCrawler<'a> {
    /// Creates a crawler for `site`
    ///
    /// # Arguments
    ///
    /// * `site` - The site to crawl
    /// * `fetcher` - Shared fetcher
    /// * `settings` - Page ceiling, politeness delay, concurrency, comparison mode
    /// * `cancel` - Run-wide cancellation signal
    pub fn new(
        site: &'a SiteConfig,
        fetcher: &'a Fetcher,
        settings: CrawlerConfig,
        cancel: CancellationToken,
    ) -> Self {
        let gate = PolitenessGate::new(Duration::from_millis(settings.politeness_delay_ms));
        Self {
            site,
            fetcher,
            settings,
            gate,
            cancel,
            phase: CrawlPhase::AdvancingPage,
        }
    }

    /// Current phase of the crawl
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to one of its terminal outcomes
    ///
    /// # Returns
    ///
    /// * `Ok(SiteCrawlReport)` - Records collected before the crawl stopped
    /// * `Err(TallyError::InvalidTransition)` - The state machine was driven illegally
    pub async fn crawl(mut self) -> Result<SiteCrawlReport, TallyError> {
        let name = self.site.name.clone();
        let start = self.site.start_index;
        let end = start.saturating_add(self.settings.max_pages);

        let mut progress = Progress::default();
        let mut previous_ids: Option<Vec<String>> = None;
        let mut previous_records: Option<Vec<PostRecord>> = None;
        let mut failed_streak = 0u32;
        let mut index = start;

        loop {
            if self.cancel.is_cancelled() {
                return self.finish(CrawlOutcome::Cancelled, progress);
            }
            if index >= end {
                tracing::warn!(
                    "Reached max pages ({}) when crawling {}, finishing there",
                    self.settings.max_pages,
                    name
                );
                return self.finish(CrawlOutcome::MaxPagesReached, progress);
            }

            // ===== Listing page =====
            self.transition(CrawlPhase::FetchingListing)?;
            let url = self.site.listing_url(index);
            tracing::info!("Crawling page {} of {}: '{}'", index - start + 1, name, url);

            let listing = match self.fetcher.fetch_gated(&url, &self.gate).await {
                Ok(document) => document,
                Err(FetchError::Cancelled { .. }) => {
                    return self.finish(CrawlOutcome::Cancelled, progress);
                }
                Err(e) => {
                    tracing::error!("Listing page {} of {} failed: {}", url, name, e);
                    return self.finish(CrawlOutcome::ListingFailed, progress);
                }
            };

            self.transition(CrawlPhase::ExtractingArticles)?;
            let articles = match self.site.strategy.list_articles(&listing) {
                Ok(articles) => articles,
                Err(e) => {
                    tracing::error!("Could not read listing page {} of {}: {}", url, name, e);
                    return self.finish(CrawlOutcome::ListingFailed, progress);
                }
            };
            progress.pages_crawled += 1;

            if articles.is_empty() {
                tracing::info!("Listing page {} of {} is empty", url, name);
                return self.finish(CrawlOutcome::Exhausted, progress);
            }

            let ids: Vec<String> = articles.iter().map(|a| a.id().to_string()).collect();
            if self.settings.page_comparison == PageComparison::Identifiers
                && previous_ids.as_ref() == Some(&ids)
            {
                tracing::info!("Listing page {} of {} repeats the previous page", url, name);
                return self.finish(CrawlOutcome::Repeated, progress);
            }

            // ===== Articles =====
            let needs_fetch = articles.iter().any(|a| matches!(a, Article::Remote(_)));
            if needs_fetch {
                self.transition(CrawlPhase::FetchingArticles)?;
            }
            let harvest = self.harvest(articles).await;
            self.transition(CrawlPhase::PageComplete)?;

            progress.articles_attempted += harvest.attempted;
            progress.articles_failed += harvest.failed;

            if self.cancel.is_cancelled() {
                progress.records.extend(harvest.records);
                return self.finish(CrawlOutcome::Cancelled, progress);
            }

            if self.settings.page_comparison == PageComparison::Records
                && !harvest.records.is_empty()
                && previous_records.as_ref() == Some(&harvest.records)
            {
                tracing::info!("Listing page {} of {} repeats the previous page", url, name);
                return self.finish(CrawlOutcome::Repeated, progress);
            }

            if harvest.all_failed() {
                failed_streak += 1;
                tracing::warn!(
                    "All {} articles on {} failed ({} failed page(s) in a row)",
                    harvest.attempted,
                    url,
                    failed_streak
                );
                if failed_streak >= self.settings.max_failed_pages {
                    return self.finish(CrawlOutcome::TooManyFailedPages, progress);
                }
            } else {
                failed_streak = 0;
            }

            tracing::debug!(
                "Page {} of {} yielded {} of {} articles",
                index - start + 1,
                name,
                harvest.records.len(),
                harvest.attempted
            );
            progress.records.extend(harvest.records.iter().cloned());
            previous_ids = Some(ids);
            previous_records = Some(harvest.records);

            self.transition(CrawlPhase::AdvancingPage)?;
            index += 1;
        }
    }

    /// Fetches and extracts the articles of one page
    ///
    /// Remote articles are fetched with up to `article_concurrency` requests in
    /// flight, all paced by the site's politeness gate. Results keep listing
    /// order. Failures are logged and counted, never propagated.
    async fn harvest(&self, articles: Vec<Article>) -> PageHarvest {
        let attempted = articles.len();
        let concurrency = self.settings.article_concurrency.max(1);

        let results: Vec<Option<PostRecord>> = stream::iter(articles)
            .map(|article| self.process_article(article))
            .buffered(concurrency)
            .collect()
            .await;

        let records: Vec<PostRecord> = results.into_iter().flatten().collect();
        PageHarvest {
            failed: attempted - records.len(),
            records,
            attempted,
        }
    }

    async fn process_article(&self, article: Article) -> Option<PostRecord> {
        match article {
            Article::Embedded { url, post } => post
                .map_err(|e| tracing::error!("Error parsing {}, skipping: {}", url, e))
                .ok(),
            Article::Remote(url) => {
                let document = match self.fetcher.fetch_gated(&url, &self.gate).await {
                    Ok(document) => document,
                    Err(FetchError::Cancelled { .. }) => return None,
                    Err(e) => {
                        tracing::error!("Error getting {}, skipping: {}", url, e);
                        return None;
                    }
                };
                self.site
                    .strategy
                    .extract_post(&document, &url)
                    .map_err(|e| tracing::error!("Error parsing {}, skipping: {}", url, e))
                    .ok()
            }
        }
    }

    /// Moves to `next`, rejecting illegal transitions
    fn transition(&mut self, next: CrawlPhase) -> Result<(), TallyError> {
        if !self.phase.can_transition_to(next) {
            return Err(TallyError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("{}: {} -> {}", self.site.name, self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn finish(
        &mut self,
        outcome: CrawlOutcome,
        progress: Progress,
    ) -> Result<SiteCrawlReport, TallyError> {
        self.transition(CrawlPhase::Finished(outcome))?;
        tracing::info!(
            "Finished crawling {} ({}): {} records from {} pages, {} of {} articles failed",
            self.site.name,
            outcome,
            progress.records.len(),
            progress.pages_crawled,
            progress.articles_failed,
            progress.articles_attempted
        );

        Ok(SiteCrawlReport {
            site: self.site.name.clone(),
            records: progress.records,
            outcome,
            pages_crawled: progress.pages_crawled,
            articles_attempted: progress.articles_attempted,
            articles_failed: progress.articles_failed,
        })
    }
}
