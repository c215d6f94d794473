/// Crawl phase definitions for the per-site pagination state machine
///
/// This module defines every phase a site crawl moves through and which moves
/// between phases are legal.
use std::fmt;

/// Why a site crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlOutcome {
    /// A listing page yielded no articles
    Exhausted,

    /// A listing page was equal to the one before it
    Repeated,

    /// The page ceiling was hit while pages kept looking new
    MaxPagesReached,

    /// A listing page could not be fetched or parsed
    ListingFailed,

    /// Too many consecutive pages on which every article failed
    TooManyFailedPages,

    /// The run-wide cancellation signal fired
    Cancelled,
}

impl CrawlOutcome {
    /// Returns true if the site ran out of content on its own
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Repeated)
    }

    /// Returns true if the crawl stopped before the site ran out of content
    pub fn is_partial(&self) -> bool {
        !self.is_complete()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::Repeated => "repeated",
            Self::MaxPagesReached => "max_pages_reached",
            Self::ListingFailed => "listing_failed",
            Self::TooManyFailedPages => "too_many_failed_pages",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the current phase of a site crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Moving on to the next listing page index
    AdvancingPage,

    /// Fetching the listing page
    FetchingListing,

    /// Reading article identifiers off the listing page
    ExtractingArticles,

    /// Fetching and extracting the articles of the page
    FetchingArticles,

    /// The page's records are known and the termination policy is applied
    PageComplete,

    // ===== Terminal Phase =====
    /// The crawl stopped
    Finished(CrawlOutcome),
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// Returns true if moving from this phase to `next` is legal
    ///
    /// Cancellation may interrupt any active phase.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlOutcome::*;
        use CrawlPhase::*;

        if !self.is_terminal() && next == Finished(Cancelled) {
            return true;
        }

        matches!(
            (self, next),
            (AdvancingPage, FetchingListing)
                | (AdvancingPage, Finished(MaxPagesReached))
                | (FetchingListing, ExtractingArticles)
                | (FetchingListing, Finished(ListingFailed))
                | (ExtractingArticles, FetchingArticles)
                | (ExtractingArticles, PageComplete)
                | (ExtractingArticles, Finished(Exhausted))
                | (ExtractingArticles, Finished(Repeated))
                | (ExtractingArticles, Finished(ListingFailed))
                | (FetchingArticles, PageComplete)
                | (PageComplete, AdvancingPage)
                | (PageComplete, Finished(Repeated))
                | (PageComplete, Finished(TooManyFailedPages))
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdvancingPage => write!(f, "advancing_page"),
            Self::FetchingListing => write!(f, "fetching_listing"),
            Self::ExtractingArticles => write!(f, "extracting_articles"),
            Self::FetchingArticles => write!(f, "fetching_articles"),
            Self::PageComplete => write!(f, "page_complete"),
            Self::Finished(outcome) => write!(f, "finished({})", outcome),
        }
    }
}
