//! SQLite link source implementation
//!
//! This module provides a SQLite-based implementation of the LinkSource trait.

use crate::source::schema::{HAS_PAGE_HTML_SQL, LINKS_AFTER_SQL, MAX_ID_SQL, PAGE_HTML_SQL};
use crate::source::traits::{LinkSource, SourceError, SourceResult};
use crate::source::LinkRecord;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// SQLite link source
pub struct SqliteLinkSource {
    conn: Connection,
    has_page_html: bool,
}

impl SqliteLinkSource {
    /// Opens a source database read-only
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteLinkSource)` - Successfully opened database
    /// * `Err(SourceError)` - Failed to open database
    pub fn open(path: &Path) -> SourceResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| SourceError::Open {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_connection(conn)
    }

    /// Wraps an existing connection
    pub fn from_connection(conn: Connection) -> SourceResult<Self> {
        let tables: i64 = conn.query_row(HAS_PAGE_HTML_SQL, [], |row| row.get(0))?;
        if tables == 0 {
            tracing::debug!("Source has no page_html table; link text lookups will be empty");
        }

        Ok(Self {
            conn,
            has_page_html: tables > 0,
        })
    }

    /// Creates an in-memory source with the expected schema (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> SourceResult<Self> {
        let conn = Connection::open_in_memory()?;
        crate::source::schema::initialize_schema(&conn)?;
        Self::from_connection(conn)
    }

    /// Gives access to the underlying connection (for testing)
    #[cfg(test)]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl LinkSource for SqliteLinkSource {
    fn max_id(&self) -> SourceResult<Option<i64>> {
        let max: Option<i64> = self.conn.query_row(MAX_ID_SQL, [], |row| row.get(0))?;
        Ok(max)
    }

    fn links_after(&self, after_id: i64, limit: usize) -> SourceResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare_cached(LINKS_AFTER_SQL)?;

        let links = stmt
            .query_map(params![after_id, limit as i64], |row| {
                Ok(LinkRecord {
                    source_id: row.get(0)?,
                    from_page_id: row.get(1)?,
                    target_url: row.get(2)?,
                    page_title: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn page_html(&self, page_id: i64) -> SourceResult<Option<String>> {
        if !self.has_page_html {
            return Ok(None);
        }

        let html = self
            .conn
            .query_row(PAGE_HTML_SQL, params![page_id], |row| row.get(0))
            .optional()?;

        Ok(html)
    }
}
