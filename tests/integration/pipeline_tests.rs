//! End-to-end tests: configuration to corpus file to analysis report

use crate::common::{mount_article, mount_listing, pipeline_config, rss};
use chrono::Utc;
use post_tally::crawler::{analyze_run, crawl, resume_run, Orchestrator};
use post_tally::output::read_analysis;
use post_tally::storage::{analysis_file_name, CrawlRun};
use post_tally::CrawlOutcome;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_sites(server: &MockServer) {
    mount_listing(server, 1, &["/posts/a", "/posts/b"]).await;
    mount_listing(server, 2, &[]).await;
    mount_article(server, "/posts/a", "Alpha", 1, 1).await;
    mount_article(server, "/posts/b", "Bravo", 2, 1).await;

    let feed = rss(&[
        ("first", "First Feed Post", "Cats run. Dogs run fast."),
        ("second", "Second Feed Post", "Feeds carry whole posts."),
    ]);
    // Out-of-range pages repeat the last page
    for page in ["1", "2"] {
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("paged", page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(feed.clone())
                    .insert_header("content-type", "application/rss+xml"),
            )
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_crawl_writes_corpus_tagged_by_site() {
    let server = MockServer::start().await;
    mount_sites(&server).await;
    let dir = TempDir::new().unwrap();

    let orchestrator = Orchestrator::new(pipeline_config(&server, dir.path()), CancellationToken::new())
        .expect("Failed to create orchestrator");
    let summary = orchestrator.crawl(Utc::now()).await.expect("Crawl failed");

    assert_eq!(summary.run.records.len(), 4);
    assert_eq!(summary.reports.len(), 2);
    for report in &summary.reports {
        match report.site.as_str() {
            "mocknews" => assert_eq!(report.outcome, CrawlOutcome::Exhausted),
            "mockfeed" => assert_eq!(report.outcome, CrawlOutcome::Repeated),
            other => panic!("Unexpected site {}", other),
        }
    }

    let news: Vec<_> = summary
        .run
        .records
        .iter()
        .filter(|r| r.site == "mocknews")
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(news, vec!["Alpha", "Bravo"]);
    let feed: Vec<_> = summary
        .run
        .records
        .iter()
        .filter(|r| r.site == "mockfeed")
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(feed, vec!["First Feed Post", "Second Feed Post"]);

    // The persisted corpus reads back as the same ordered records
    let loaded = CrawlRun::load(&summary.corpus_path).expect("Failed to load corpus");
    assert_eq!(loaded.records, summary.run.records);
    assert_eq!(loaded.timestamp(), summary.run.timestamp());
}

#[tokio::test]
async fn test_analysis_and_resume_agree() {
    let server = MockServer::start().await;
    mount_sites(&server).await;
    let dir = TempDir::new().unwrap();
    let config = pipeline_config(&server, dir.path());

    let orchestrator = Orchestrator::new(config.clone(), CancellationToken::new())
        .expect("Failed to create orchestrator");
    let summary = orchestrator.crawl(Utc::now()).await.expect("Crawl failed");

    let (analysis, report_path) = analyze_run(&config, &summary.run).expect("Analysis failed");
    assert_eq!(analysis.num_posts, 4);
    assert_eq!(
        report_path,
        dir.path().join(analysis_file_name(summary.run.timestamp()))
    );
    assert_eq!(read_analysis(&report_path).unwrap(), analysis);
    assert_eq!(
        analysis.freq_dist.values().sum::<usize>(),
        analysis.num_meaningful_words
    );
    assert_eq!(analysis.freq_dist.len(), analysis.num_unique_words);
    assert_eq!(analysis.freq_dist.get("run"), Some(&2));

    // Resuming from the corpus file skips crawling and yields the same report
    std::fs::remove_file(&report_path).unwrap();
    let (run, resumed, resumed_path) =
        resume_run(&config, &summary.corpus_path).expect("Resume failed");
    assert_eq!(run.records.len(), 4);
    assert_eq!(resumed, analysis);
    assert_eq!(resumed_path, report_path);
    assert!(resumed_path.exists());
}

#[tokio::test]
async fn test_one_failing_site_does_not_stop_others() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &["/posts/a"]).await;
    mount_listing(&server, 2, &[]).await;
    mount_article(&server, "/posts/a", "Alpha", 1, 1).await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = crawl(pipeline_config(&server, dir.path()), CancellationToken::new())
        .await
        .expect("Run failed");

    assert_eq!(summary.run.records.len(), 1);
    let feed = summary
        .reports
        .iter()
        .find(|r| r.site == "mockfeed")
        .expect("Missing feed report");
    assert_eq!(feed.outcome, CrawlOutcome::ListingFailed);

    // A full run analyzes what was collected
    let report_path = dir.path().join(analysis_file_name(summary.run.timestamp()));
    assert_eq!(read_analysis(&report_path).unwrap().num_posts, 1);
}

#[tokio::test]
async fn test_cancelled_run_leaves_empty_corpus() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let orchestrator = Orchestrator::new(pipeline_config(&server, dir.path()), cancel)
        .expect("Failed to create orchestrator");
    let (summary, analysis) = orchestrator.run(true).await.expect("Run failed");

    assert!(summary.run.records.is_empty());
    assert!(summary
        .reports
        .iter()
        .all(|r| r.outcome == CrawlOutcome::Cancelled));
    assert!(analysis.is_none());

    let loaded = CrawlRun::load(&summary.corpus_path).expect("Corpus should exist");
    assert!(loaded.records.is_empty());
}
