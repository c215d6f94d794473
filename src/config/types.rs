use serde::Deserialize;

/// Main configuration structure for Post-Tally
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

/// How two consecutive listing pages are compared to detect a site that keeps
/// re-serving its last page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PageComparison {
    /// Compare the article identifiers listed on each page
    #[default]
    Identifiers,
    /// Compare the fully extracted records of each page
    Records,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Hard ceiling on listing pages visited per site
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Minimum time between requests to the same site (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay")]
    pub politeness_delay_ms: u64,

    /// Maximum number of article fetches in flight for one listing page
    #[serde(rename = "article-concurrency", default = "default_article_concurrency")]
    pub article_concurrency: usize,

    /// Repeated-page detection mode
    #[serde(rename = "page-comparison", default)]
    pub page_comparison: PageComparison,

    /// Consecutive pages on which every article failed before giving up on a site
    #[serde(rename = "max-failed-pages", default = "default_max_failed_pages")]
    pub max_failed_pages: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            politeness_delay_ms: default_politeness_delay(),
            article_concurrency: default_article_concurrency(),
            page_comparison: PageComparison::default(),
            max_failed_pages: default_max_failed_pages(),
        }
    }
}

/// Retry and timeout settings for the fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubled on each following one (milliseconds)
    #[serde(rename = "base-delay-ms", default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Cap on the exponential part of the delay (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Upper bound of the random jitter added to every wait (milliseconds)
    #[serde(rename = "max-jitter-ms", default = "default_max_jitter")]
    pub max_jitter_ms: u64,

    #[serde(rename = "timeout-secs", default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            max_jitter_ms: default_max_jitter(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Client identities presented to sites, one picked at random per attempt
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    pub pool: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the raw corpus and analysis files
    pub directory: String,
}

/// Analyzer resources
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    /// Optional stopword file replacing the built-in English list
    #[serde(rename = "stopwords-path")]
    pub stopwords_path: Option<String>,

    /// Words added on top of the stopword list
    #[serde(rename = "extra-stopwords", default)]
    pub extra_stopwords: Vec<String>,

    /// Number of worker threads the corpus is sharded over (1 = sequential)
    #[serde(default)]
    pub shards: Option<usize>,
}

/// One crawled site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Name recorded in the `site` column of every post
    pub name: String,

    /// Listing page URL with a `{}` placeholder for the page index
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Index of the first listing page
    #[serde(rename = "start-index", default)]
    pub start_index: u32,

    pub extractor: ExtractorConfig,
}

/// Selects and parameterizes the extraction strategy of a site
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExtractorConfig {
    /// HTML listing pages linking to HTML article pages
    Html(HtmlExtractorConfig),
    /// RSS/Atom listing pages carrying the posts inline
    Feed,
}

/// CSS selectors driving the HTML strategy
#[derive(Debug, Clone, Deserialize)]
pub struct HtmlExtractorConfig {
    /// Container that every listing page must have; a listing page without
    /// it is treated as broken rather than empty
    #[serde(default)]
    pub listing: Option<String>,

    /// Anchor elements on the listing page pointing at articles
    #[serde(rename = "article-link")]
    pub article_link: String,

    pub title: String,

    pub body: String,

    pub date: String,

    /// Attribute of the date element holding the timestamp; the element text
    /// is used when absent
    #[serde(rename = "date-attribute")]
    pub date_attribute: Option<String>,

    /// Subtrees removed from the body before its text is collected
    #[serde(default)]
    pub strip: Vec<String>,
}

fn default_max_pages() -> u32 {
    1500
}

fn default_politeness_delay() -> u64 {
    1000
}

fn default_article_concurrency() -> usize {
    1
}

fn default_max_failed_pages() -> u32 {
    3
}

fn default_max_attempts() -> u32 {
    10
}

fn default_base_delay() -> u64 {
    2000
}

fn default_max_delay() -> u64 {
    60_000
}

fn default_max_jitter() -> u64 {
    30_000
}

fn default_timeout() -> u64 {
    30
}
