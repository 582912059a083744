//! Chunked export of link records into the tabular store

use crate::config::{ExportConfig, LinkTextPolicy};
use crate::export::cursor::ExportCursor;
use crate::export::link_text::find_link_text;
use crate::limiter::RateLimiter;
use crate::source::{LinkRecord, LinkSource};
use crate::store::{InsertMode, RangeSpec, Row, TabularStore};
use crate::url::{convert_page_title, normalize_link, Normalized, NormalizedLink};
use std::collections::HashSet;

/// Options for one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Source rows read per chunk
    pub chunk_size: usize,

    /// Maximum source rows processed (0 = unlimited)
    pub max_links: u64,

    /// Externally persisted watermark; when set the export area is kept and
    /// only rows after it are appended
    pub resume_after: Option<i64>,

    pub link_text: LinkTextPolicy,
}

impl ExportOptions {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            max_links: config.max_links,
            resume_after: None,
            link_text: config.link_text,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// Outcome of an export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Rows appended to the export sheet
    pub appended: usize,

    /// Rows dropped because of an excluded protocol
    pub excluded: usize,

    /// Append callouts issued
    pub chunks: usize,

    /// Link text lookups performed
    pub link_text_lookups: usize,

    /// Watermark reached, if any row was read
    pub last_exported_id: Option<i64>,
}

/// Copies link records from the source into the export sheet
pub struct LinkExporter<'a> {
    source: &'a dyn LinkSource,
    store: &'a dyn TabularStore,
    sheet: String,
    excluded_protocols: Vec<String>,
}

impl<'a> LinkExporter<'a> {
    /// Creates an exporter writing to the sheet named `sheet`
    pub fn new(
        source: &'a dyn LinkSource,
        store: &'a dyn TabularStore,
        sheet: &str,
        excluded_protocols: &[String],
    ) -> Self {
        Self {
            source,
            store,
            sheet: sheet.to_string(),
            excluded_protocols: excluded_protocols.to_vec(),
        }
    }

    /// Runs one export
    ///
    /// Unless resuming, the export area is cleared first so a rerun rebuilds it
    /// from scratch. Rows are read in ascending identifier order up to the
    /// highest identifier present at start. Excluded-protocol rows are dropped;
    /// everything else is appended, one callout per chunk.
    pub async fn export(
        &self,
        limiter: &mut RateLimiter,
        options: &ExportOptions,
    ) -> crate::Result<ExportReport> {
        let mut report = ExportReport::default();

        if options.resume_after.is_none() {
            let clear = RangeSpec::from_row(&self.sheet, "A", "D", 2)?;
            tracing::info!("Clearing exported links in {}", clear);
            limiter.acquire().await;
            self.store.clear_range(&clear).await?;
        }

        let Some(ceiling) = self.source.max_id()? else {
            tracing::info!("Source has no links to export");
            return Ok(report);
        };

        let start_after = options.resume_after.unwrap_or(0);
        let mut cursor = ExportCursor::new(start_after, ceiling, options.chunk_size);
        let append_range = RangeSpec::columns(&self.sheet, "A", "ZZZ")?;
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut processed: u64 = 0;

        while !cursor.is_exhausted() {
            let remaining = match options.max_links {
                0 => None,
                max => Some(max.saturating_sub(processed)),
            };
            if remaining == Some(0) {
                tracing::info!("Reached the limit of {} links", options.max_links);
                break;
            }

            let (after_id, limit) = cursor.window(remaining);
            tracing::info!("Loading link records after id {}...", after_id);
            let records = self.source.links_after(after_id, limit)?;
            if records.is_empty() {
                break;
            }

            let mut rows: Vec<Row> = Vec::with_capacity(records.len());
            let mut past_ceiling = false;

            for record in &records {
                if !cursor.within_ceiling(record.source_id) {
                    past_ceiling = true;
                    break;
                }
                cursor.advance(record.source_id);
                processed += 1;

                match normalize_link(&record.target_url, &self.excluded_protocols) {
                    Normalized::Link(link) => {
                        let row = self.build_row(
                            record,
                            &link,
                            options.link_text,
                            &mut seen_urls,
                            &mut report,
                        )?;
                        rows.push(row);
                    }
                    Normalized::Excluded => {
                        tracing::debug!("Skipping excluded link {}", record.target_url);
                        report.excluded += 1;
                    }
                }
            }
            report.last_exported_id = Some(cursor.last_exported_id());

            if !rows.is_empty() {
                let count = rows.len();
                limiter.acquire().await;
                report.appended += self
                    .store
                    .append(&append_range, rows, InsertMode::InsertRows)
                    .await?;
                report.chunks += 1;
                tracing::debug!("Appended {} rows to {}", count, self.sheet);
            }

            if past_ceiling {
                break;
            }
        }

        tracing::info!(
            "Exported {} links in {} chunks ({} excluded, {} link text lookups)",
            report.appended,
            report.chunks,
            report.excluded,
            report.link_text_lookups
        );

        Ok(report)
    }

    fn build_row(
        &self,
        record: &LinkRecord,
        link: &NormalizedLink,
        policy: LinkTextPolicy,
        seen_urls: &mut HashSet<String>,
        report: &mut ExportReport,
    ) -> crate::Result<Row> {
        let mut row = vec![
            link.canonical_url.clone(),
            record.from_page_id.to_string(),
            convert_page_title(&record.page_title),
        ];

        let lookup = match policy {
            LinkTextPolicy::Never => return Ok(row),
            LinkTextPolicy::Always => true,
            LinkTextPolicy::FirstOccurrence => seen_urls.insert(link.canonical_url.clone()),
        };

        let text = if lookup {
            report.link_text_lookups += 1;
            self.lookup_link_text(record.from_page_id, &link.canonical_url)?
        } else {
            String::new()
        };
        row.push(text);

        Ok(row)
    }

    fn lookup_link_text(&self, page_id: i64, canonical_url: &str) -> crate::Result<String> {
        let text = self
            .source
            .page_html(page_id)?
            .and_then(|html| find_link_text(&html, canonical_url, &self.excluded_protocols))
            .unwrap_or_default();
        Ok(text)
    }
}
