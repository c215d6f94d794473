//! Extraction strategies
//!
//! Every site is read through an [`ExtractionStrategy`]: given a fetched
//! listing page it names the articles on that page, and given a fetched
//! article page it produces a [`PostRecord`]. Strategies never fetch; the
//! crawler fetches documents and hands them over.
//!
//! Two configurable strategies are built in:
//! - [`HtmlStrategy`]: CSS selectors over HTML listing and article pages
//! - [`FeedStrategy`]: RSS/Atom listing pages carrying posts inline

mod date;
mod feed;
mod html;

pub use date::normalize_date;
pub use feed::FeedStrategy;
pub use html::{resolve_link, HtmlStrategy};

use crate::config::{ExtractorConfig, SiteEntry};
use crate::storage::PostRecord;
use crate::{ConfigError, ExtractionResult};
use scraper::Html;

/// A successfully fetched response body
#[derive(Debug, Clone)]
pub struct Document {
    url: String,
    body: String,
}

impl Document {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// URL the document was requested from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw response body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body into an HTML tree for selector queries
    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// An article named by a listing page
#[derive(Debug, Clone)]
pub enum Article {
    /// Article living at its own URL, fetched and extracted separately
    Remote(String),

    /// Article carried by the listing page itself (feeds). Extraction
    /// already happened and may have failed for this one entry.
    Embedded {
        url: String,
        post: ExtractionResult<PostRecord>,
    },
}

impl Article {
    /// Identifier of the article, used to compare consecutive listing pages
    pub fn id(&self) -> &str {
        match self {
            Self::Remote(url) => url,
            Self::Embedded { url, .. } => url,
        }
    }
}

/// Site-specific extraction logic
pub trait ExtractionStrategy: Send + Sync {
    /// Lists the articles on a listing page, in page order
    ///
    /// An error means the page itself is unusable, not that it is empty.
    fn list_articles(&self, listing: &Document) -> ExtractionResult<Vec<Article>>;

    /// Extracts one post from an article page
    ///
    /// # Arguments
    ///
    /// * `article` - The fetched article page
    /// * `source_url` - URL recorded as the post's link
    fn extract_post(&self, article: &Document, source_url: &str) -> ExtractionResult<PostRecord>;
}

/// Builds the strategy configured for a site
///
/// # Returns
///
/// * `Ok(Box<dyn ExtractionStrategy>)` - Strategy ready to use
/// * `Err(ConfigError)` - A selector failed to parse
pub fn build_strategy(site: &SiteEntry) -> Result<Box<dyn ExtractionStrategy>, ConfigError> {
    match &site.extractor {
        ExtractorConfig::Html(html) => Ok(Box::new(HtmlStrategy::new(&site.name, html)?)),
        ExtractorConfig::Feed => Ok(Box::new(FeedStrategy::new())),
    }
}
