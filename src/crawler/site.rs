use crate::config::{SiteEntry, PAGE_PLACEHOLDER};
use crate::extract::{build_strategy, ExtractionStrategy};
use crate::ConfigError;
use std::fmt;
use std::sync::Arc;

/// A crawlable site, built once at startup and never modified
#[derive(Clone)]
pub struct SiteConfig {
    pub name: String,
    /// Listing page URL with a `{}` page placeholder
    pub listing_url_template: String,
    pub start_index: u32,
    pub strategy: Arc<dyn ExtractionStrategy>,
}

impl SiteConfig {
    pub fn new(
        name: impl Into<String>,
        listing_url_template: impl Into<String>,
        start_index: u32,
        strategy: Arc<dyn ExtractionStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            listing_url_template: listing_url_template.into(),
            start_index,
            strategy,
        }
    }

    /// Builds a site and its extraction strategy from a configuration entry
    pub fn from_entry(entry: &SiteEntry) -> Result<Self, ConfigError> {
        Ok(Self::new(
            &entry.name,
            &entry.listing_url,
            entry.start_index,
            Arc::from(build_strategy(entry)?),
        ))
    }

    /// URL of the listing page at `index`
    pub fn listing_url(&self, index: u32) -> String {
        self.listing_url_template
            .replacen(PAGE_PLACEHOLDER, &index.to_string(), 1)
    }
}

impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("name", &self.name)
            .field("listing_url_template", &self.listing_url_template)
            .field("start_index", &self.start_index)
            .finish_non_exhaustive()
    }
}
