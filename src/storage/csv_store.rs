//! CSV-backed corpus store
//!
//! One row per post with the columns `site, title, body, date, link` under a
//! header row. Dates are written as RFC 3339 timestamps. Field sizes are not
//! limited, so arbitrarily large bodies survive a round trip.

use crate::storage::traits::{CorpusStore, StorageError, StorageResult};
use crate::storage::PostRecord;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Header row of every raw corpus file
pub const CORPUS_HEADER: [&str; 5] = ["site", "title", "body", "date", "link"];

#[derive(Debug, Serialize, Deserialize)]
struct CorpusRow {
    site: String,
    title: String,
    body: String,
    date: String,
    link: String,
}

impl From<&PostRecord> for CorpusRow {
    fn from(record: &PostRecord) -> Self {
        Self {
            site: record.site.clone(),
            title: record.title.clone(),
            body: record.body.clone(),
            date: record.published_at.to_rfc3339(),
            link: record.url.clone(),
        }
    }
}

/// Corpus store writing to a single CSV file
#[derive(Debug, Clone)]
pub struct CsvCorpusStore {
    path: PathBuf,
}

impl CsvCorpusStore {
    /// Creates (or truncates) the corpus file and writes the header row
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the corpus file
    ///
    /// # Returns
    ///
    /// * `Ok(CsvCorpusStore)` - Store ready for appends
    /// * `Err(StorageError)` - The file could not be created
    pub fn create(path: &Path) -> StorageResult<Self> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(CORPUS_HEADER)?;
        writer.flush()?;

        tracing::debug!("Created corpus file {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Opens an existing corpus file without modifying it
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl CorpusStore for CsvCorpusStore {
    fn append(&mut self, records: &[PostRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        for record in records {
            writer.serialize(CorpusRow::from(record))?;
        }
        writer.flush()?;

        tracing::debug!(
            "Appended {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> StorageResult<Vec<PostRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        if headers.iter().ne(CORPUS_HEADER.iter().copied()) {
            return Err(StorageError::MalformedRow {
                row: 1,
                message: format!("unexpected header {:?}", headers),
            });
        }

        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<CorpusRow>().enumerate() {
            let row = row?;
            // Header is row 1
            let row_number = index as u64 + 2;
            let published_at = DateTime::parse_from_rfc3339(&row.date).map_err(|_| {
                StorageError::InvalidDate {
                    row: row_number,
                    value: row.date.clone(),
                }
            })?;

            records.push(PostRecord {
                site: row.site,
                title: row.title,
                body: row.body,
                published_at,
                url: row.link,
            });
        }

        Ok(records)
    }
}
