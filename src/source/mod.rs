//! Source module for reading link records
//!
//! This module handles all reads from the relational link source, including:
//! - Establishing the export ceiling (highest link identifier)
//! - Cursoring through links in ascending identifier order
//! - Looking up rendered page bodies for link text extraction

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteLinkSource;
pub use traits::{LinkSource, SourceError, SourceResult};

use std::path::Path;

/// Opens the configured source database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteLinkSource)` - Successfully opened source
/// * `Err(SourceError)` - Failed to open source
pub fn open_source(path: &Path) -> SourceResult<SqliteLinkSource> {
    SqliteLinkSource::open(path)
}

/// One external link occurrence, as stored in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Monotonic, unique identifier used for pagination
    pub source_id: i64,

    /// Page the link was found on
    pub from_page_id: i64,

    /// The raw target URL
    pub target_url: String,

    /// Stored title of the page (empty if the page is unknown)
    pub page_title: String,
}
