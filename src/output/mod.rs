//! Output module for analysis reports and run summaries
//!
//! This module handles:
//! - Writing the analysis report as JSON
//! - Printing human-readable summaries of a crawl and its analysis

pub mod stats;

pub use stats::{print_analysis, print_crawl_summary, render_analysis, render_crawl_summary};

use crate::analysis::CorpusAnalysis;
use crate::TallyError;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes an analysis report to `path`, replacing any existing file
///
/// # Arguments
///
/// * `path` - Destination, normally `post_analysis_{timestamp}.json`
/// * `analysis` - The analysis to write
///
/// # Returns
///
/// * `Ok(())` - The report was written and flushed
/// * `Err(TallyError)` - The file could not be created or written
pub fn write_analysis(path: &Path, analysis: &CorpusAnalysis) -> Result<(), TallyError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, analysis)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads an analysis report written by [`write_analysis`]
pub fn read_analysis(path: &Path) -> Result<CorpusAnalysis, TallyError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
