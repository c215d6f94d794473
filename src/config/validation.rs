use crate::config::types::{
    Config, CrawlerConfig, ExtractorConfig, FetchConfig, OutputConfig, SiteEntry, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Placeholder substituted with the page index in listing URLs
pub const PAGE_PLACEHOLDER: &str = "{}";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }

    if config.article_concurrency < 1 || config.article_concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "article_concurrency must be between 1 and 64, got {}",
            config.article_concurrency
        )));
    }

    if config.max_failed_pages < 1 {
        return Err(ConfigError::Validation(
            "max_failed_pages must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the retry policy settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max_attempts must be >= 1".to_string(),
        ));
    }

    if config.base_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "base_delay_ms ({}) cannot exceed max_delay_ms ({})",
            config.base_delay_ms, config.max_delay_ms
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the identity pool
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent pool cannot be empty".to_string(),
        ));
    }

    if config.pool.iter().any(|agent| agent.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user-agent pool cannot contain blank entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates site entries
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for site in sites {
        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site name cannot be empty".to_string(),
            ));
        }

        if !seen.insert(site.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "site '{}' is configured more than once",
                site.name
            )));
        }

        validate_listing_url(site)?;
        validate_extractor(site)?;
    }

    Ok(())
}

/// Checks the listing template has exactly one page placeholder and yields
/// an HTTP(S) URL once filled in
fn validate_listing_url(site: &SiteEntry) -> Result<(), ConfigError> {
    let placeholders = site.listing_url.matches(PAGE_PLACEHOLDER).count();
    if placeholders != 1 {
        return Err(ConfigError::Validation(format!(
            "listing-url of site '{}' must contain exactly one '{}' placeholder, found {}",
            site.name, PAGE_PLACEHOLDER, placeholders
        )));
    }

    let sample = site
        .listing_url
        .replace(PAGE_PLACEHOLDER, &site.start_index.to_string());
    let url = Url::parse(&sample).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "listing-url '{}' of site '{}': {}",
            site.listing_url, site.name, e
        ))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "listing-url of site '{}' must use http or https, got {}",
            site.name,
            url.scheme()
        )));
    }

    Ok(())
}

/// Checks every selector of an HTML extractor parses
fn validate_extractor(site: &SiteEntry) -> Result<(), ConfigError> {
    let ExtractorConfig::Html(html) = &site.extractor else {
        return Ok(());
    };

    let selectors = [&html.article_link, &html.title, &html.body, &html.date]
        .into_iter()
        .chain(html.listing.iter())
        .chain(html.strip.iter());

    for selector in selectors {
        if Selector::parse(selector).is_err() {
            return Err(ConfigError::InvalidSelector {
                site: site.name.clone(),
                selector: selector.clone(),
            });
        }
    }

    Ok(())
}
