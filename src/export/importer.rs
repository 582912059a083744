//! Seeding the status sheet from the new-links view

use crate::limiter::RateLimiter;
use crate::store::{InsertMode, RangeSpec, ReadResult, Row, TabularStore};

/// Outcome of importing new links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Rows appended to the status sheet
    Imported(usize),

    /// The view returned no rows
    Empty,

    /// The view reported explicitly that it has no data
    NoData,
}

impl ImportOutcome {
    /// Number of rows appended (0 for both no-op outcomes)
    pub fn count(&self) -> usize {
        match self {
            Self::Imported(n) => *n,
            Self::Empty | Self::NoData => 0,
        }
    }
}

/// Appends links from the new-links view to the status sheet
pub struct NewLinksImporter<'a> {
    store: &'a dyn TabularStore,
    new_links: String,
    links_status: String,
}

impl<'a> NewLinksImporter<'a> {
    pub fn new(store: &'a dyn TabularStore, new_links: &str, links_status: &str) -> Self {
        Self {
            store,
            new_links: new_links.to_string(),
            links_status: links_status.to_string(),
        }
    }

    /// Reads the view's URL column and appends each URL as a new status row
    ///
    /// Every appended row starts with an empty cell so the status sheet's
    /// row-index column is left to the sheet.
    pub async fn import_new_links(&self, limiter: &mut RateLimiter) -> crate::Result<ImportOutcome> {
        let view = RangeSpec::from_row(&self.new_links, "C", "C", 2)?;

        limiter.acquire().await;
        let rows = match self.store.get(&view).await? {
            ReadResult::NoData => {
                tracing::info!("{} reported no data. Nothing to import.", self.new_links);
                return Ok(ImportOutcome::NoData);
            }
            ReadResult::Rows(rows) => rows,
        };

        let values: Vec<Row> = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| {
                let mut status_row = Vec::with_capacity(row.len() + 1);
                status_row.push(String::new());
                status_row.extend(row);
                status_row
            })
            .collect();

        if values.is_empty() {
            tracing::info!("Found no new links to add");
            return Ok(ImportOutcome::Empty);
        }

        tracing::info!(
            "Appending {} new links to {}...",
            values.len(),
            self.links_status
        );
        let target = RangeSpec::columns(&self.links_status, "A", "ZZZ")?;
        limiter.acquire().await;
        let appended = self
            .store
            .append(&target, values, InsertMode::InsertRows)
            .await?;

        Ok(ImportOutcome::Imported(appended))
    }
}
