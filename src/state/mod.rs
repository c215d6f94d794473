//! State module for tracking crawl progress
//!
//! This module provides state management for site crawls.
//!
//! # Components
//!
//! - `CrawlPhase`: Tracks the phase of a site's pagination crawl and which moves between phases are legal
//! - `CrawlOutcome`: Why a site crawl stopped
//! - `SiteState`: Tracks per-site request timing for the politeness delay

mod crawl_phase;
mod site_state;

// Re-export main types
pub use crawl_phase::{CrawlOutcome, CrawlPhase};
pub use site_state::SiteState;
