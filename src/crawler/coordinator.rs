//! Crawl orchestration
//!
//! This module ties a whole run together:
//! - Building every configured site and the shared fetcher
//! - Crawling all sites concurrently, each under its own politeness gate
//! - Tagging records with their site and appending them to the corpus file
//!   as soon as a site finishes
//! - Running the analysis over a finished or resumed run

use crate::analysis::{Analyzer, CorpusAnalysis, StopWords};
use crate::config::Config;
use crate::crawler::pagination::{PaginationCrawler, SiteCrawlReport};
use crate::crawler::site::SiteConfig;
use crate::crawler::Fetcher;
use crate::output::write_analysis;
use crate::storage::{analysis_file_name, corpus_file_name, CorpusStore, CrawlRun, CsvCorpusStore};
use crate::TallyError;
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Result of crawling every configured site
#[derive(Debug)]
pub struct CrawlSummary {
    pub run: CrawlRun,
    pub reports: Vec<SiteCrawlReport>,
    /// The raw corpus file the run was written to
    pub corpus_path: PathBuf,
}

/// Runs the configured sites and hands their records to the corpus store
pub struct Orchestrator {
    config: Config,
    sites: Vec<SiteConfig>,
    fetcher: Fetcher,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Creates an orchestrator from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `cancel` - Run-wide cancellation signal
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Every site and its strategy were built
    /// * `Err(TallyError)` - A site could not be built or the HTTP client failed
    pub fn new(config: Config, cancel: CancellationToken) -> Result<Self, TallyError> {
        let fetcher = Fetcher::new(&config.fetch, &config.user_agent, cancel.clone())?;
        Self::with_fetcher(config, fetcher, cancel)
    }

    /// Creates an orchestrator around an existing fetcher
    pub fn with_fetcher(
        config: Config,
        fetcher: Fetcher,
        cancel: CancellationToken,
    ) -> Result<Self, TallyError> {
        let sites = config
            .sites
            .iter()
            .map(SiteConfig::from_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            sites,
            fetcher,
            cancel,
        })
    }

    pub fn sites(&self) -> &[SiteConfig] {
        &self.sites
    }

    /// Crawls every site and persists the records
    ///
    /// Sites are crawled concurrently. The corpus file is created up front
    /// and each site's records are appended when that site finishes, so a
    /// cancelled or failing run still leaves a best-effort corpus behind.
    /// Records in the run follow site completion order, and page order
    /// within a site.
    ///
    /// # Arguments
    ///
    /// * `started_at` - Start time of the run, embedded in the file names
    pub async fn crawl(&self, started_at: DateTime<Utc>) -> Result<CrawlSummary, TallyError> {
        let output_dir = Path::new(&self.config.output.directory);
        std::fs::create_dir_all(output_dir)?;

        let mut run = CrawlRun::new(started_at);
        let corpus_path = output_dir.join(corpus_file_name(run.timestamp()));
        let mut store = CsvCorpusStore::create(&corpus_path)?;

        tracing::info!(
            "Crawling {} sites into {}",
            self.sites.len(),
            corpus_path.display()
        );

        let pending: FuturesUnordered<_> = self
            .sites
            .iter()
            .map(|site| async move {
                let crawler = PaginationCrawler::new(
                    site,
                    &self.fetcher,
                    self.config.crawler.clone(),
                    self.cancel.clone(),
                );
                (site.name.as_str(), crawler.crawl().await)
            })
            .collect();

        let reports = collect_reports(pending, &mut store, &mut run).await?;

        log_summary(&reports);

        Ok(CrawlSummary {
            run,
            reports,
            corpus_path,
        })
    }

    /// Crawls, then analyzes unless the run was cancelled
    ///
    /// # Returns
    ///
    /// The crawl summary and, when analysis ran, the analysis with the path
    /// it was written to
    pub async fn run(
        &self,
        analyze: bool,
    ) -> Result<(CrawlSummary, Option<(CorpusAnalysis, PathBuf)>), TallyError> {
        let summary = self.crawl(Utc::now()).await?;

        if !analyze {
            return Ok((summary, None));
        }
        if self.cancel.is_cancelled() {
            tracing::warn!(
                "Run cancelled, skipping analysis; rerun with --crawl-state {}",
                summary.corpus_path.display()
            );
            return Ok((summary, None));
        }

        let analysis = analyze_run(&self.config, &summary.run)?;
        Ok((summary, Some(analysis)))
    }
}

/// Analyzes a run and writes `post_analysis_{timestamp}.json` next to the corpus
pub fn analyze_run(
    config: &Config,
    run: &CrawlRun,
) -> Result<(CorpusAnalysis, PathBuf), TallyError> {
    let stopwords = StopWords::from_config(&config.analysis)?;
    let analyzer = Analyzer::new(stopwords);

    let analysis = match config.analysis.shards {
        Some(shards) if shards > 1 => analyzer.analyze_sharded(&run.records, shards),
        _ => analyzer.analyze(&run.records),
    };

    let output_dir = Path::new(&config.output.directory);
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(analysis_file_name(run.timestamp()));
    write_analysis(&path, &analysis)?;

    tracing::info!("Wrote analysis of {} posts to {}", analysis.num_posts, path.display());
    Ok((analysis, path))
}

/// Loads a previously written corpus and analyzes it without crawling
///
/// # Arguments
///
/// * `config` - Configuration supplying the stopwords and output directory
/// * `corpus_path` - A `raw_posts_{timestamp}.csv` file
pub fn resume_run(
    config: &Config,
    corpus_path: &Path,
) -> Result<(CrawlRun, CorpusAnalysis, PathBuf), TallyError> {
    let run = CrawlRun::load(corpus_path)?;
    let (analysis, path) = analyze_run(config, &run)?;
    Ok((run, analysis, path))
}

/// Tags and persists each site report as it arrives
///
/// A site whose crawl aborted with an error is logged and left out; the
/// remaining sites keep running. Only storage failures end the run.
async fn collect_reports<'a, S>(
    mut pending: S,
    store: &mut impl CorpusStore,
    run: &mut CrawlRun,
) -> Result<Vec<SiteCrawlReport>, TallyError>
where
    S: Stream<Item = (&'a str, Result<SiteCrawlReport, TallyError>)> + Unpin,
{
    let mut reports = Vec::new();
    while let Some((site, result)) = pending.next().await {
        let mut report = match result {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Crawl of {} aborted: {}", site, e);
                continue;
            }
        };
        report.records = report
            .records
            .into_iter()
            .map(|record| record.with_site(&report.site))
            .collect();

        store.append(&report.records)?;
        run.records.extend(report.records.iter().cloned());
        reports.push(report);
    }
    Ok(reports)
}

fn log_summary(reports: &[SiteCrawlReport]) {
    for report in reports {
        let line = format!(
            "{}: {} records, {} pages, {}/{} articles failed, stopped: {}",
            report.site,
            report.records.len(),
            report.pages_crawled,
            report.articles_failed,
            report.articles_attempted,
            report.outcome
        );
        if report.outcome.is_partial() {
            tracing::warn!("{}", line);
        } else {
            tracing::info!("{}", line);
        }
    }
}
