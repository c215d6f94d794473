//! Storage module for persisting crawl data
//!
//! This module handles the raw corpus of a crawl run, including:
//! - The post record and crawl run types shared by crawler and analyzer
//! - Append-only persistence of records to a flat CSV file
//! - File naming that embeds the run timestamp, and parsing it back out
//!   when a previous run is resumed

mod csv_store;
mod traits;

pub use csv_store::{CsvCorpusStore, CORPUS_HEADER};
pub use traits::{CorpusStore, StorageError, StorageResult};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::path::Path;

/// Prefix and suffix of raw corpus file names (`raw_posts_{timestamp}.csv`)
const CORPUS_PREFIX: &str = "raw_posts_";
const CORPUS_SUFFIX: &str = ".csv";

/// Prefix and suffix of analysis file names (`post_analysis_{timestamp}.json`)
const ANALYSIS_PREFIX: &str = "post_analysis_";
const ANALYSIS_SUFFIX: &str = ".json";

/// One post extracted from a site
///
/// Posts are never modified after extraction. Two posts are the same post when
/// site and url match, but nothing deduplicates records on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub site: String,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<FixedOffset>,
    pub url: String,
}

impl PostRecord {
    /// Returns a copy of this record attributed to `site`
    pub fn with_site(mut self, site: &str) -> Self {
        self.site = site.to_string();
        self
    }
}

/// The records collected by one invocation
#[derive(Debug, Clone)]
pub struct CrawlRun {
    pub started_at: DateTime<Utc>,
    pub records: Vec<PostRecord>,
}

impl CrawlRun {
    /// Starts an empty run at `started_at`
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            records: Vec::new(),
        }
    }

    /// Unix timestamp used in the file names of this run
    pub fn timestamp(&self) -> i64 {
        self.started_at.timestamp()
    }

    /// Loads a previously persisted run, recovering its start time from the
    /// file name
    ///
    /// # Arguments
    ///
    /// * `path` - A `raw_posts_{timestamp}.csv` file
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRun)` - The stored records in file order
    /// * `Err(StorageError)` - The name carries no timestamp or the file is unreadable
    pub fn load(path: &Path) -> StorageResult<Self> {
        let timestamp = parse_corpus_timestamp(path)?;
        let started_at = Utc
            .timestamp_opt(timestamp, 0)
            .single()
            .ok_or_else(|| StorageError::InvalidFileName(path.display().to_string()))?;

        let records = CsvCorpusStore::open(path).load()?;
        tracing::info!(
            "Loaded {} records from {} (run started {})",
            records.len(),
            path.display(),
            started_at
        );

        Ok(Self {
            started_at,
            records,
        })
    }
}

/// File name of the raw corpus for a run started at `timestamp`
pub fn corpus_file_name(timestamp: i64) -> String {
    format!("{}{}{}", CORPUS_PREFIX, timestamp, CORPUS_SUFFIX)
}

/// File name of the analysis report for a run started at `timestamp`
pub fn analysis_file_name(timestamp: i64) -> String {
    format!("{}{}{}", ANALYSIS_PREFIX, timestamp, ANALYSIS_SUFFIX)
}

/// Extracts the run timestamp from a raw corpus file path
///
/// # Example
///
/// ```
/// use post_tally::storage::parse_corpus_timestamp;
/// use std::path::Path;
///
/// let ts = parse_corpus_timestamp(Path::new("out/raw_posts_1700000000.csv")).unwrap();
/// assert_eq!(ts, 1_700_000_000);
/// ```
pub fn parse_corpus_timestamp(path: &Path) -> StorageResult<i64> {
    let invalid = || StorageError::InvalidFileName(path.display().to_string());

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
    name.strip_prefix(CORPUS_PREFIX)
        .and_then(|rest| rest.strip_suffix(CORPUS_SUFFIX))
        .and_then(|digits| digits.parse::<i64>().ok())
        .ok_or_else(invalid)
}
