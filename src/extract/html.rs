//! Selector-driven HTML strategy
//!
//! Listing pages are scanned for article links; article pages yield title,
//! body and publication date through configured CSS selectors. Boilerplate
//! subtrees (donation banners, share widgets) are detached before the body
//! text is collected.

use crate::config::HtmlExtractorConfig;
use crate::extract::{normalize_date, Article, Document, ExtractionStrategy};
use crate::storage::PostRecord;
use crate::{ConfigError, ExtractionError, ExtractionResult};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extraction strategy for HTML sites
#[derive(Debug)]
pub struct HtmlStrategy {
    listing: Option<Selector>,
    article_link: Selector,
    title: Selector,
    body: Selector,
    date: Selector,
    date_attribute: Option<String>,
    strip: Vec<Selector>,
}

impl HtmlStrategy {
    /// Compiles the selectors of a site
    ///
    /// # Arguments
    ///
    /// * `site` - Site name, used in error messages
    /// * `config` - The selector configuration
    pub fn new(site: &str, config: &HtmlExtractorConfig) -> Result<Self, ConfigError> {
        let compile = |selector: &str| {
            Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
                site: site.to_string(),
                selector: selector.to_string(),
            })
        };

        Ok(Self {
            listing: config.listing.as_deref().map(|s| compile(s)).transpose()?,
            article_link: compile(&config.article_link)?,
            title: compile(&config.title)?,
            body: compile(&config.body)?,
            date: compile(&config.date)?,
            date_attribute: config.date_attribute.clone(),
            strip: config
                .strip
                .iter()
                .map(|s| compile(s))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Removes every subtree matching a strip selector
    fn strip_boilerplate(&self, document: &mut Html) {
        let doomed: Vec<_> = self
            .strip
            .iter()
            .flat_map(|selector| document.select(selector).map(|element| element.id()))
            .collect();

        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

impl ExtractionStrategy for HtmlStrategy {
    fn list_articles(&self, listing: &Document) -> ExtractionResult<Vec<Article>> {
        let base = Url::parse(listing.url()).map_err(|_| ExtractionError::MissingElement {
            url: listing.url().to_string(),
            element: "valid base URL".to_string(),
        })?;
        let document = listing.html();

        let links: Vec<ElementRef<'_>> = match &self.listing {
            Some(container) => {
                let containers: Vec<_> = document.select(container).collect();
                if containers.is_empty() {
                    return Err(ExtractionError::MissingElement {
                        url: listing.url().to_string(),
                        element: "listing container".to_string(),
                    });
                }
                containers
                    .into_iter()
                    .flat_map(|c| c.select(&self.article_link))
                    .collect()
            }
            None => document.select(&self.article_link).collect(),
        };

        let mut seen = HashSet::new();
        let articles = links
            .into_iter()
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, &base))
            .filter(|url| seen.insert(url.clone()))
            .map(Article::Remote)
            .collect();

        Ok(articles)
    }

    fn extract_post(&self, article: &Document, source_url: &str) -> ExtractionResult<PostRecord> {
        let mut document = article.html();
        self.strip_boilerplate(&mut document);

        let missing = |element: &str| ExtractionError::MissingElement {
            url: source_url.to_string(),
            element: element.to_string(),
        };

        let title = document
            .select(&self.title)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| missing("title"))?;

        let body = document
            .select(&self.body)
            .next()
            .map(element_text)
            .ok_or_else(|| missing("body"))?;

        let date_element = document
            .select(&self.date)
            .next()
            .ok_or_else(|| missing("date"))?;
        let raw_date = match &self.date_attribute {
            Some(attribute) => date_element
                .value()
                .attr(attribute)
                .map(str::to_string)
                .ok_or_else(|| missing(&format!("date attribute '{}'", attribute)))?,
            None => element_text(date_element),
        };
        let published_at = normalize_date(&raw_date, source_url)?;

        Ok(PostRecord {
            site: String::new(),
            title,
            body,
            published_at,
            url: source_url.to_string(),
        })
    }
}

/// Concatenated, trimmed text content of an element
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
