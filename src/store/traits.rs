//! Store traits and error types
//!
//! This module defines the capability interface for tabular store backends
//! and associated error types.

use crate::store::{InsertMode, RangeSpec, RangeUpdate, ReadResult, Row};
use crate::UrlError;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error calling store: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),

    #[error("Invalid range: {0}")]
    InvalidRange(#[from] UrlError),

    #[error("Store call failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<StoreError> },
}

impl StoreError {
    /// Returns true if the failure is worth retrying
    ///
    /// Remote rate limiting (429), server errors, timeouts and connection
    /// failures are transient; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for range-addressable tabular stores
///
/// This is the whole surface the pipelines need from the remote store. Any
/// backend that can read, clear, append and batch-write A1 ranges can stand in
/// for the spreadsheet.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Blanks every cell in a range (idempotent)
    async fn clear_range(&self, range: &RangeSpec) -> StoreResult<()>;

    /// Reads the values in a range
    ///
    /// Trailing empty rows and cells are not returned. A view that reports
    /// the explicit "no data" marker yields [`ReadResult::NoData`].
    async fn get(&self, range: &RangeSpec) -> StoreResult<ReadResult>;

    /// Appends rows after the last row of the table found in `range`
    ///
    /// # Returns
    ///
    /// The number of rows written
    async fn append(&self, range: &RangeSpec, rows: Vec<Row>, mode: InsertMode)
        -> StoreResult<usize>;

    /// Writes several ranges in one callout
    ///
    /// # Returns
    ///
    /// The number of rows written
    async fn batch_update(&self, updates: Vec<RangeUpdate>) -> StoreResult<usize>;
}
