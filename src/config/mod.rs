//! Configuration module for Post-Tally
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration describes the crawled sites, the fetch retry policy, the
//! client identity pool, and where output files go.
//!
//! # Example
//!
//! ```no_run
//! use post_tally::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling {} sites", config.sites.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AnalysisConfig, Config, CrawlerConfig, ExtractorConfig, FetchConfig, HtmlExtractorConfig,
    OutputConfig, PageComparison, SiteEntry, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::PAGE_PLACEHOLDER;
