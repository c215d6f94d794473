//! Integration test suite
//!
//! Every test runs against wiremock servers and temporary directories; no
//! test touches the network or the working directory.

mod crawl_tests;
mod fetch_tests;
mod pipeline_tests;
