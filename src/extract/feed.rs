//! RSS/Atom feed strategy
//!
//! Each listing page is a feed page whose entries carry the whole post, so
//! no article page is ever fetched. Entry markup is reduced to plain text.

use crate::extract::{Article, Document, ExtractionStrategy};
use crate::storage::PostRecord;
use crate::{ExtractionError, ExtractionResult};
use feed_rs::model::Entry;
use scraper::Html;

/// Extraction strategy for paginated RSS/Atom feeds
#[derive(Debug, Default)]
pub struct FeedStrategy;

impl FeedStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ExtractionStrategy for FeedStrategy {
    fn list_articles(&self, listing: &Document) -> ExtractionResult<Vec<Article>> {
        let feed = feed_rs::parser::parse(listing.body().as_bytes()).map_err(|e| {
            ExtractionError::Feed {
                url: listing.url().to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(feed
            .entries
            .into_iter()
            .map(|entry| {
                let url = entry_link(&entry);
                let post = entry_post(entry, &url);
                Article::Embedded { url, post }
            })
            .collect())
    }

    fn extract_post(&self, article: &Document, source_url: &str) -> ExtractionResult<PostRecord> {
        // Feed entries are complete on the listing page; a standalone article
        // document is read as a one-entry feed.
        let listing = Document::new(source_url, article.body());
        match self.list_articles(&listing)?.into_iter().next() {
            Some(Article::Embedded { post, .. }) => post,
            _ => Err(ExtractionError::MissingElement {
                url: source_url.to_string(),
                element: "feed entry".to_string(),
            }),
        }
    }
}

/// Link of an entry, falling back to its id
fn entry_link(entry: &Entry) -> String {
    entry
        .links
        .first()
        .map(|link| link.href.clone())
        .unwrap_or_else(|| entry.id.clone())
}

fn entry_post(entry: Entry, url: &str) -> ExtractionResult<PostRecord> {
    let missing = |element: &str| ExtractionError::MissingElement {
        url: url.to_string(),
        element: element.to_string(),
    };

    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("title"))?;

    let markup = entry
        .content
        .and_then(|c| c.body)
        .or_else(|| entry.summary.map(|s| s.content))
        .ok_or_else(|| missing("content"))?;

    let published_at = entry
        .published
        .or(entry.updated)
        .ok_or_else(|| missing("published date"))?
        .fixed_offset();

    Ok(PostRecord {
        site: String::new(),
        title,
        body: markup_text(&markup),
        published_at,
        url: url.to_string(),
    })
}

/// Plain text of an HTML fragment
fn markup_text(markup: &str) -> String {
    Html::parse_fragment(markup)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}
