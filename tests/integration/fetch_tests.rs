//! Integration tests for the retrying fetcher

use crate::common::{fetcher, AGENT};
use post_tally::crawler::{Fetcher, RetryPolicy, UserAgentPool};
use post_tally::FetchError;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_retry_ceiling_is_exact() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = fetcher(3, CancellationToken::new());
    let url = format!("{}/flaky", server.uri());

    match fetcher.fetch(&url).await {
        Err(FetchError::Terminal { url: failed, attempts, last }) => {
            assert_eq!(failed, url);
            assert_eq!(attempts, 3);
            assert!(last.contains("503"), "unexpected reason: {}", last);
        }
        other => panic!("Expected a terminal failure, got {:?}", other.map(|d| d.url().to_string())),
    }
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let server = MockServer::start().await;

    // Earlier mounts win while they still match
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(5, CancellationToken::new());
    let document = fetcher
        .fetch(&format!("{}/recovering", server.uri()))
        .await
        .expect("Fetch should recover");

    assert_eq!(document.body(), "finally");
}

#[tokio::test]
async fn test_not_found_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = fetcher(2, CancellationToken::new());
    let result = fetcher.fetch(&format!("{}/missing", server.uri())).await;

    assert!(matches!(result, Err(FetchError::Terminal { attempts: 2, .. })));
}

#[tokio::test]
async fn test_identity_comes_from_pool() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .and(header("user-agent", AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(1, CancellationToken::new());
    let document = fetcher
        .fetch(&format!("{}/whoami", server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(document.body(), "ok");
}

#[tokio::test]
async fn test_cancellation_interrupts_backoff() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let policy = RetryPolicy {
        max_attempts: 10,
        base_delay: Duration::from_secs(60),
        max_delay: Duration::from_secs(60),
        max_jitter: Duration::ZERO,
    };
    let fetcher = Fetcher::with_client(
        reqwest::Client::new(),
        policy,
        UserAgentPool::new(vec![AGENT.to_string()]),
        cancel.clone(),
    );

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let result = fetcher.fetch(&format!("{}/down", server.uri())).await;

    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(matches!(result, Err(FetchError::Cancelled { .. })));
}
