//! Integration tests for the pagination crawler
//!
//! These tests use wiremock to serve listing and article pages and drive
//! a single site crawl end-to-end.

use crate::common::{
    fetcher, html_site, listing_html, mount_article, mount_listing, settings,
};
use post_tally::config::{CrawlerConfig, PageComparison};
use post_tally::crawler::PaginationCrawler;
use post_tally::CrawlOutcome;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn titles(records: &[post_tally::PostRecord]) -> Vec<&str> {
    records.iter().map(|r| r.title.as_str()).collect()
}

#[tokio::test]
async fn test_repeated_page_stops_crawl() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a", "/posts/b"]).await;
    mount_listing(&server, 2, &["/posts/c", "/posts/d"]).await;
    // The site clamps out-of-range indices to its last page
    mount_listing(&server, 3, &["/posts/c", "/posts/d"]).await;

    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;
    mount_article(&server, "/posts/b", "Bravo", 2, 1).await;
    // Page 3 is recognised by its identifiers, so these are fetched once
    mount_article(&server, "/posts/c", "Charlie", 3, 1).await;
    mount_article(&server, "/posts/d", "Delta", 4, 1).await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 1);

    let report = PaginationCrawler::new(&site, &fetcher, settings(100), cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::Repeated);
    assert_eq!(titles(&report.records), vec!["Alpha", "Bravo", "Charlie", "Delta"]);
    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.articles_attempted, 4);
    assert_eq!(report.articles_failed, 0);
}

#[tokio::test]
async fn test_repeated_page_by_records() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a", "/posts/b"]).await;
    mount_listing(&server, 2, &["/posts/c", "/posts/d"]).await;
    mount_listing(&server, 3, &["/posts/c", "/posts/d"]).await;

    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;
    mount_article(&server, "/posts/b", "Bravo", 2, 1).await;
    // Record comparison has to fetch the repeated page's articles
    mount_article(&server, "/posts/c", "Charlie", 3, 2).await;
    mount_article(&server, "/posts/d", "Delta", 4, 2).await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 1);
    let settings = CrawlerConfig {
        page_comparison: PageComparison::Records,
        ..settings(100)
    };

    let report = PaginationCrawler::new(&site, &fetcher, settings, cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::Repeated);
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.articles_attempted, 6);
}

#[tokio::test]
async fn test_empty_page_stops_crawl() {
    let server = MockServer::start().await;

    mount_listing(&server, 0, &["/posts/a"]).await;
    mount_listing(&server, 1, &[]).await;
    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 0);

    let report = PaginationCrawler::new(&site, &fetcher, settings(100), cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::Exhausted);
    assert_eq!(titles(&report.records), vec!["Alpha"]);
    assert_eq!(report.pages_crawled, 2);
}

#[tokio::test]
async fn test_max_pages_ceiling() {
    let server = MockServer::start().await;

    for page in 1..=6 {
        let article = format!("/posts/{}", page);
        mount_listing(&server, page, &[article.as_str()]).await;
    }
    Mock::given(method("GET"))
        .and(path_regex("^/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(crate::common::article_html(
            "Same title",
            "Same text.",
            1,
        )))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 1);

    let report = PaginationCrawler::new(&site, &fetcher, settings(3), cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::MaxPagesReached);
    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.records.len(), 3);
    let urls: Vec<_> = report.records.iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        urls,
        (1..=3)
            .map(|n| format!("{}/posts/{}", server.uri(), n))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_failed_article_is_skipped() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a", "/posts/broken", "/posts/c"]).await;
    mount_listing(&server, 2, &[]).await;
    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;
    mount_article(&server, "/posts/c", "Charlie", 3, 1).await;
    Mock::given(method("GET"))
        .and(path("/posts/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(2, cancel.clone());
    let site = html_site(&server, 1);

    let report = PaginationCrawler::new(&site, &fetcher, settings(100), cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::Exhausted);
    assert_eq!(titles(&report.records), vec!["Alpha", "Charlie"]);
    assert_eq!(report.articles_attempted, 3);
    assert_eq!(report.articles_failed, 1);
}

#[tokio::test]
async fn test_all_failed_pages_are_not_empty_pages() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a"]).await;
    mount_listing(&server, 2, &["/posts/b"]).await;
    mount_listing(&server, 3, &["/posts/c"]).await;
    mount_listing(&server, 4, &["/posts/d"]).await;
    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;
    // Articles without the expected markup fail extraction
    Mock::given(method("GET"))
        .and(path_regex("^/posts/[bcd]$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>gone</body></html>"))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 1);
    let settings = CrawlerConfig {
        max_failed_pages: 2,
        ..settings(100)
    };

    let report = PaginationCrawler::new(&site, &fetcher, settings, cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    // Page 2 failing entirely must not be read as the end of the site
    assert_eq!(report.outcome, CrawlOutcome::TooManyFailedPages);
    assert_eq!(titles(&report.records), vec!["Alpha"]);
    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.articles_failed, 2);
}

#[tokio::test]
async fn test_listing_failure_keeps_collected_records() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a"]).await;
    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(2, cancel.clone());
    let site = html_site(&server, 1);

    let report = PaginationCrawler::new(&site, &fetcher, settings(100), cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::ListingFailed);
    assert_eq!(titles(&report.records), vec!["Alpha"]);
}

#[tokio::test]
async fn test_redesigned_listing_is_not_an_empty_listing() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a"]).await;
    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;
    // Article links are still present, but outside the listing container
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><body><main class="grid"><a class="post" href="/posts/b">b</a></main></body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_article(&server, "/posts/b", "Bravo", 2, 0).await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 1);

    let report = PaginationCrawler::new(&site, &fetcher, settings(100), cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::ListingFailed);
    assert!(!report.outcome.is_complete());
    assert_eq!(titles(&report.records), vec!["Alpha"]);
    assert_eq!(report.pages_crawled, 1);
}

#[tokio::test]
async fn test_cancellation_stops_promptly() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a"]).await;
    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(&["/posts/b"]))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 1);

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let report = PaginationCrawler::new(&site, &fetcher, settings(100), cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(report.outcome, CrawlOutcome::Cancelled);
    assert_eq!(titles(&report.records), vec!["Alpha"]);
}

#[tokio::test]
async fn test_politeness_delay_spaces_requests() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a", "/posts/b"]).await;
    mount_listing(&server, 2, &[]).await;
    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;
    mount_article(&server, "/posts/b", "Bravo", 2, 1).await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 1);
    let settings = CrawlerConfig {
        politeness_delay_ms: 100,
        article_concurrency: 2,
        ..settings(100)
    };

    let start = Instant::now();
    let report = PaginationCrawler::new(&site, &fetcher, settings, cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    // Four requests, three enforced gaps
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn test_concurrent_articles_keep_listing_order() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/slow", "/posts/fast", "/posts/mid"]).await;
    mount_listing(&server, 2, &[]).await;
    for (route, title, delay_ms) in [
        ("/posts/slow", "Slow", 400),
        ("/posts/fast", "Fast", 0),
        ("/posts/mid", "Mid", 150),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(crate::common::article_html(title, "Some text.", 5))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&server)
            .await;
    }

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 1);
    let settings = CrawlerConfig {
        article_concurrency: 3,
        ..settings(100)
    };

    let report = PaginationCrawler::new(&site, &fetcher, settings, cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    assert_eq!(titles(&report.records), vec!["Slow", "Fast", "Mid"]);
}

#[tokio::test]
async fn test_boilerplate_is_stripped_from_body() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a"]).await;
    mount_listing(&server, 2, &[]).await;
    mount_article(&server, "/posts/a", "Alpha", 7, 1).await;

    let cancel = CancellationToken::new();
    let fetcher = fetcher(1, cancel.clone());
    let site = html_site(&server, 1);

    let report = PaginationCrawler::new(&site, &fetcher, settings(100), cancel)
        .crawl()
        .await
        .expect("Crawl failed");

    let record = &report.records[0];
    assert_eq!(record.body, "Text of Alpha.");
    assert!(!record.body.contains("Patreon"));
    assert_eq!(record.published_at.to_rfc3339(), "2020-01-07T10:00:00+00:00");
    assert_eq!(record.url, format!("{}/posts/a", server.uri()));
}
