//! Human-readable run summaries
//!
//! This module renders the per-site crawl reports and the corpus analysis
//! for display on stdout.

use crate::analysis::CorpusAnalysis;
use crate::crawler::SiteCrawlReport;
use std::fmt::Write;

/// Renders the per-site crawl results as a table
pub fn render_crawl_summary(reports: &[SiteCrawlReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl Summary ===\n");

    let width = reports
        .iter()
        .map(|r| r.site.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let _ = writeln!(
        out,
        "  {:<width$}  {:>8}  {:>6}  {:>14}  stopped",
        "site",
        "records",
        "pages",
        "failed/tried",
        width = width
    );
    for report in reports {
        let _ = writeln!(
            out,
            "  {:<width$}  {:>8}  {:>6}  {:>14}  {}",
            report.site,
            report.records.len(),
            report.pages_crawled,
            format!("{}/{}", report.articles_failed, report.articles_attempted),
            report.outcome,
            width = width
        );
    }

    let total: usize = reports.iter().map(|r| r.records.len()).sum();
    let partial = reports.iter().filter(|r| r.outcome.is_partial()).count();
    let _ = writeln!(out, "\nTotal records: {}", total);
    if partial > 0 {
        let _ = writeln!(out, "Sites stopped early: {}", partial);
    }
    out
}

/// Renders the corpus statistics and the `top_n` most frequent words
pub fn render_analysis(analysis: &CorpusAnalysis, top_n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Corpus Analysis ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Posts: {}", analysis.num_posts);
    let _ = writeln!(out, "  Sentences: {}", analysis.num_sentences);
    let _ = writeln!(out, "  Words: {}", analysis.num_words);

    let share = if analysis.num_words > 0 {
        (analysis.num_meaningful_words as f64 / analysis.num_words as f64) * 100.0
    } else {
        0.0
    };
    let _ = writeln!(
        out,
        "  Meaningful words: {} ({:.1}%)",
        analysis.num_meaningful_words, share
    );
    let _ = writeln!(out, "  Unique words: {}", analysis.num_unique_words);

    if analysis.num_posts > 0 {
        let _ = writeln!(
            out,
            "  Words per post: {:.1}",
            analysis.num_words as f64 / analysis.num_posts as f64
        );
    }

    let top = analysis.top_words(top_n);
    if !top.is_empty() {
        let _ = writeln!(out, "\nTop {} words:", top.len());
        for (rank, (word, count)) in top.iter().enumerate() {
            let _ = writeln!(out, "  {:>3}. {} ({})", rank + 1, word, count);
        }
    }
    out
}

/// Prints the per-site crawl results to stdout
pub fn print_crawl_summary(reports: &[SiteCrawlReport]) {
    println!("{}", render_crawl_summary(reports));
}

/// Prints the corpus statistics to stdout
pub fn print_analysis(analysis: &CorpusAnalysis, top_n: usize) {
    println!("{}", render_analysis(analysis, top_n));
}
