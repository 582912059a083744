//! Source traits and error types
//!
//! This module defines the trait interface for the relational link source and
//! its error type.

use crate::source::LinkRecord;
use thiserror::Error;

/// Errors that can occur while reading the link source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to open source database {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Trait for relational link sources
///
/// A link source is an ordered, cursorable table of link records keyed by a
/// monotonically increasing identifier. The exporter only ever reads from it.
pub trait LinkSource {
    /// Returns the highest link identifier, or `None` if the table is empty
    ///
    /// The exporter reads this once at the start of a run and never exports
    /// rows above it.
    fn max_id(&self) -> SourceResult<Option<i64>>;

    /// Returns up to `limit` links with an identifier above `after_id`
    ///
    /// Rows come back in ascending identifier order.
    fn links_after(&self, after_id: i64, limit: usize) -> SourceResult<Vec<LinkRecord>>;

    /// Returns the rendered HTML of a page, if the source stores it
    ///
    /// This is the expensive lookup behind link text extraction.
    fn page_html(&self, page_id: i64) -> SourceResult<Option<String>>;
}
