//! Storage traits and error types
//!
//! This module defines the trait interface for corpus stores and
//! associated error types.

use crate::storage::PostRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File name carries no run timestamp: {0}")]
    InvalidFileName(String),

    #[error("Invalid date '{value}' on row {row}")]
    InvalidDate { row: u64, value: String },

    #[error("Malformed row {row}: {message}")]
    MalformedRow { row: u64, message: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for corpus store implementations
///
/// A store accumulates the records of one crawl run. Records are only ever
/// appended; reading returns them in the order they were appended.
pub trait CorpusStore {
    /// Appends records to the store
    ///
    /// # Arguments
    ///
    /// * `records` - Records to append, in order
    fn append(&mut self, records: &[PostRecord]) -> StorageResult<()>;

    /// Reads every record in the store, in append order
    fn load(&self) -> StorageResult<Vec<PostRecord>>;
}
