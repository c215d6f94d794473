//! Post-Tally main entry point
//!
//! This is the command-line interface for the Post-Tally crawler and corpus
//! analyzer.

use anyhow::Context;
use clap::Parser;
use post_tally::config::{load_config_with_hash, Config, ExtractorConfig};
use post_tally::crawler::{resume_run, Orchestrator};
use post_tally::output::{print_analysis, print_crawl_summary};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Post-Tally: crawl paginated content sites and tally their text
///
/// Post-Tally pages through each configured site until it runs out of new
/// posts, writes everything it collected to a CSV corpus, and computes
/// sentence, word and vocabulary statistics over the corpus.
#[derive(Parser, Debug)]
#[command(name = "post-tally")]
#[command(version)]
#[command(about = "Crawl paginated content sites and tally their text", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Analyze a previously written raw_posts_{timestamp}.csv instead of crawling
    #[arg(long, value_name = "FILE", conflicts_with_all = ["dry_run", "crawl_only"])]
    crawl_state: Option<PathBuf>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "crawl_only")]
    dry_run: bool,

    /// Crawl and write the corpus, but skip analysis
    #[arg(long)]
    crawl_only: bool,

    /// Number of most frequent words to print
    #[arg(long, value_name = "N", default_value_t = 20)]
    top: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if let Some(corpus) = &cli.crawl_state {
        handle_resume(&config, corpus, cli.top)?;
    } else {
        handle_crawl(config, !cli.crawl_only, cli.top).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("post_tally=info,warn"),
            1 => EnvFilter::new("post_tally=debug,info"),
            2 => EnvFilter::new("post_tally=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Post-Tally Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages per site: {}", config.crawler.max_pages);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Article concurrency: {}", config.crawler.article_concurrency);
    println!("  Page comparison: {:?}", config.crawler.page_comparison);
    println!("  Max failed pages: {}", config.crawler.max_failed_pages);

    println!("\nFetching:");
    println!("  Max attempts: {}", config.fetch.max_attempts);
    println!(
        "  Backoff: {}ms base, {}ms cap, up to {}ms jitter",
        config.fetch.base_delay_ms, config.fetch.max_delay_ms, config.fetch.max_jitter_ms
    );
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  User agents: {}", config.user_agent.pool.len());

    println!("\nOutput directory: {}", config.output.directory);

    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        let kind = match site.extractor {
            ExtractorConfig::Html(_) => "html",
            ExtractorConfig::Feed => "feed",
        };
        println!("  - {} [{}] from page {}", site.name, kind, site.start_index);
        println!("    * {}", site.listing_url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles --crawl-state: analyzes an existing corpus without crawling
fn handle_resume(config: &Config, corpus: &Path, top: usize) -> anyhow::Result<()> {
    tracing::info!("Reading crawl state from {}", corpus.display());
    let (run, analysis, path) = resume_run(config, corpus)
        .with_context(|| format!("failed to analyze {}", corpus.display()))?;

    tracing::info!(
        "Analyzed {} posts from run started {}",
        run.records.len(),
        run.started_at
    );
    print_analysis(&analysis, top);
    println!("Analysis written to: {}", path.display());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, analyze: bool, top: usize) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with what has been collected");
            signal.cancel();
        }
    });

    tracing::info!("Sites: {}", config.sites.len());
    let orchestrator = Orchestrator::new(config, cancel.clone())?;
    let (summary, analysis) = orchestrator.run(analyze).await.context("run failed")?;

    print_crawl_summary(&summary.reports);
    println!("Corpus written to: {}", summary.corpus_path.display());

    match analysis {
        Some((analysis, path)) => {
            print_analysis(&analysis, top);
            println!("Analysis written to: {}", path.display());
        }
        None if analyze => println!(
            "Skipping analysis; rerun with --crawl-state {}",
            summary.corpus_path.display()
        ),
        None => {}
    }
    Ok(())
}
