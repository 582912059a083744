//! Link export pipeline
//!
//! `sync-links` runs the two halves of this module in order: the exporter
//! rebuilds the export sheet from the source, then the importer moves links
//! the sheet has not seen before into the status sheet.

mod cursor;
mod exporter;
mod importer;
mod link_text;

pub use crate::config::LinkTextPolicy;
pub use cursor::ExportCursor;
pub use exporter::{ExportOptions, ExportReport, LinkExporter};
pub use importer::{ImportOutcome, NewLinksImporter};
pub use link_text::find_link_text;

use crate::config::SheetNames;
use crate::limiter::RateLimiter;
use crate::source::LinkSource;
use crate::store::TabularStore;

/// Outcome of a full `sync-links` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub export: ExportReport,
    pub import: ImportOutcome,
}

/// Exports all links, then imports the new ones into the status sheet
pub async fn sync_links(
    source: &dyn LinkSource,
    store: &dyn TabularStore,
    sheets: &SheetNames,
    excluded_protocols: &[String],
    limiter: &mut RateLimiter,
    options: &ExportOptions,
) -> crate::Result<SyncReport> {
    let exporter = LinkExporter::new(source, store, &sheets.all_links, excluded_protocols);
    let export = exporter.export(limiter, options).await?;

    let importer = NewLinksImporter::new(store, &sheets.new_links, &sheets.links_status);
    let import = importer.import_new_links(limiter).await?;

    Ok(SyncReport { export, import })
}
