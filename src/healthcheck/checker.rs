//! Paged health check over the check queue

use crate::config::{HealthCheckConfig, SheetNames};
use crate::healthcheck::cursor::HealthCheckCursor;
use crate::healthcheck::status::{url_cell, StatusRow, StatusUpdate};
use crate::limiter::RateLimiter;
use crate::probe::{detect_redirect, HttpProbe, ProbeMethod};
use crate::store::{RangeSpec, RangeUpdate, ReadResult, Row, TabularStore};
use crate::url::{is_excluded_protocol, split_url, strip_fragment};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

/// Options for one health check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckOptions {
    /// Wall-clock budget, checked between rows
    pub runtime: Duration,

    /// Maximum probes issued (0 = unlimited)
    pub max_links: u64,

    /// Updates per flush
    pub batch_size: usize,

    /// Queue rows read per page
    pub query_size: u64,

    /// Date recorded as the last-checked date
    pub today: NaiveDate,
}

impl HealthCheckOptions {
    pub fn from_config(config: &HealthCheckConfig, today: NaiveDate) -> Self {
        Self {
            runtime: Duration::from_secs(config.runtime),
            max_links: config.max_links,
            batch_size: config.batch_size,
            query_size: config.query_size,
            today,
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The queue had no further rows
    EndOfData,

    /// The runtime budget was used up
    Deadline,

    /// The probe limit was reached
    MaxLinks,
}

/// Outcome of a health check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckReport {
    pub probed: u64,
    pub skipped_duplicate_domain: u64,
    pub skipped_excluded_protocol: u64,

    /// Rows whose status row index could not be read
    pub skipped_invalid: u64,

    pub pages: u64,
    pub flushes: u64,
    pub rows_written: u64,
    pub stop: StopReason,
}

impl Default for HealthCheckReport {
    fn default() -> Self {
        Self {
            probed: 0,
            skipped_duplicate_domain: 0,
            skipped_excluded_protocol: 0,
            skipped_invalid: 0,
            pages: 0,
            flushes: 0,
            rows_written: 0,
            stop: StopReason::EndOfData,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    DuplicateDomain,
    ExcludedProtocol,
    AlreadyEvaluated,
    InvalidRow,
}

#[derive(Debug)]
enum RowAction {
    Probe(StatusRow),
    Skip(SkipReason),
}

enum PageEnd {
    /// Every row of the page was evaluated
    Complete,

    /// Evaluation stopped partway
    Stopped(StopReason),
}

/// Checks links from the queue sheet and writes results to the status sheet
///
/// A checker holds the state of one run: the domains probed so far, the
/// queue cursor and the pending batch. Create a new one for each run.
pub struct HealthChecker<'a> {
    store: &'a dyn TabularStore,
    probe: &'a dyn HttpProbe,
    next_check: String,
    links_status: String,
    excluded_protocols: Vec<String>,
    domains_checked: HashSet<String>,
    evaluated_rows: HashSet<u64>,
    cursor: HealthCheckCursor,
    pending: Vec<StatusUpdate>,
}

impl<'a> HealthChecker<'a> {
    pub fn new(
        store: &'a dyn TabularStore,
        probe: &'a dyn HttpProbe,
        sheets: &SheetNames,
        excluded_protocols: &[String],
    ) -> Self {
        Self {
            store,
            probe,
            next_check: sheets.next_check.clone(),
            links_status: sheets.links_status.clone(),
            excluded_protocols: excluded_protocols.to_vec(),
            domains_checked: HashSet::new(),
            evaluated_rows: HashSet::new(),
            cursor: HealthCheckCursor::new(),
            pending: Vec::new(),
        }
    }

    pub fn cursor(&self) -> &HealthCheckCursor {
        &self.cursor
    }

    /// Updates not yet written to the store
    pub fn pending(&self) -> &[StatusUpdate] {
        &self.pending
    }

    /// Runs the health check until the queue is exhausted, the deadline
    /// passes or the probe limit is reached
    ///
    /// Each page starts at the cursor. Pending updates are written whenever
    /// the batch is full, at the end of every page and before returning. A
    /// failed write leaves the batch pending and ends the run with the error.
    pub async fn run(
        &mut self,
        limiter: &mut RateLimiter,
        options: &HealthCheckOptions,
    ) -> crate::Result<HealthCheckReport> {
        let deadline = Instant::now() + options.runtime;
        let query_size = options.query_size.max(1);
        let mut report = HealthCheckReport::default();

        let stop = loop {
            if Instant::now() >= deadline {
                break StopReason::Deadline;
            }
            if limit_reached(options, &report) {
                break StopReason::MaxLinks;
            }

            let start = self.cursor.position();
            let end = start.saturating_add(query_size - 1);
            let range = RangeSpec::rows(&self.next_check, "A", "F", start, end)?;
            tracing::debug!("Reading check queue {}", range);

            limiter.acquire().await;
            let rows = match self.store.get(&range).await? {
                ReadResult::NoData => {
                    tracing::info!("{} reported no data", self.next_check);
                    break StopReason::EndOfData;
                }
                ReadResult::Rows(rows) => rows,
            };
            report.pages += 1;

            if rows.is_empty() {
                tracing::info!("Row {} in {} is empty", start, self.next_check);
                break StopReason::EndOfData;
            }

            let last_page = (rows.len() as u64) < query_size;
            let evaluated_before = self.evaluated_rows.len();

            let end = self
                .process_page(start, rows, limiter, options, deadline, &mut report)
                .await?;
            self.flush(limiter, &mut report).await?;

            if let PageEnd::Stopped(reason) = end {
                break reason;
            }
            if last_page {
                break StopReason::EndOfData;
            }
            if self.cursor.position() == start && self.evaluated_rows.len() == evaluated_before {
                tracing::warn!("Check queue made no progress at row {}", start);
                break StopReason::EndOfData;
            }
        };

        self.flush(limiter, &mut report).await?;
        report.stop = stop;

        tracing::info!(
            "Health check finished ({:?}): {} probed, {} duplicate domains skipped, {} excluded protocols skipped, {} rows written in {} flushes",
            report.stop,
            report.probed,
            report.skipped_duplicate_domain,
            report.skipped_excluded_protocol,
            report.rows_written,
            report.flushes
        );

        Ok(report)
    }

    async fn process_page(
        &mut self,
        start: u64,
        rows: Vec<Row>,
        limiter: &mut RateLimiter,
        options: &HealthCheckOptions,
        deadline: Instant,
        report: &mut HealthCheckReport,
    ) -> crate::Result<PageEnd> {
        for (offset, row) in rows.iter().enumerate() {
            if Instant::now() >= deadline {
                return Ok(PageEnd::Stopped(StopReason::Deadline));
            }
            if limit_reached(options, report) {
                return Ok(PageEnd::Stopped(StopReason::MaxLinks));
            }

            let position = start + offset as u64;
            if url_cell(row).is_empty() {
                tracing::info!("Row {} in {} has no URL", position, self.next_check);
                return Ok(PageEnd::Stopped(StopReason::EndOfData));
            }

            match self.classify(row) {
                RowAction::Skip(reason) => {
                    self.cursor.observe(position, true);
                    match reason {
                        SkipReason::DuplicateDomain => report.skipped_duplicate_domain += 1,
                        SkipReason::ExcludedProtocol => report.skipped_excluded_protocol += 1,
                        SkipReason::InvalidRow => report.skipped_invalid += 1,
                        SkipReason::AlreadyEvaluated => {}
                    }
                }
                RowAction::Probe(status_row) => {
                    self.cursor.observe(position, false);
                    let update = self.check(&status_row, options.today).await;
                    report.probed += 1;
                    self.pending.push(update);

                    if self.pending.len() >= options.batch_size {
                        self.flush(limiter, report).await?;
                    }
                }
            }
        }

        Ok(PageEnd::Complete)
    }

    /// Decides whether a queue row is probed or skipped
    fn classify(&mut self, row: &Row) -> RowAction {
        let Some(status_row) = StatusRow::from_row(row) else {
            tracing::warn!("Skipping queue row without a usable row index: {:?}", row);
            return RowAction::Skip(SkipReason::InvalidRow);
        };

        if !self.evaluated_rows.insert(status_row.row_index) {
            return RowAction::Skip(SkipReason::AlreadyEvaluated);
        }

        let url = strip_fragment(&status_row.url);
        let (protocol, domain) = match split_url(&status_row.url) {
            Some(parts) => {
                let domain = parts.domain_key();
                (parts.protocol, domain)
            }
            None => (String::new(), status_row.url.to_lowercase()),
        };

        if self.domains_checked.contains(&domain) {
            tracing::debug!("Skipping additional link to domain {}: {}", domain, url);
            RowAction::Skip(SkipReason::DuplicateDomain)
        } else if is_excluded_protocol(&protocol, &self.excluded_protocols) {
            tracing::debug!("Skipping URL with an excluded protocol: {}", url);
            RowAction::Skip(SkipReason::ExcludedProtocol)
        } else {
            self.domains_checked.insert(domain);
            RowAction::Probe(status_row)
        }
    }

    /// Probes one link and builds its status update
    async fn check(&self, row: &StatusRow, today: NaiveDate) -> StatusUpdate {
        let url = strip_fragment(&row.url);
        let method = ProbeMethod::for_last_status(row.last_status_code);

        let response = self.probe.probe(url, method).await;
        let status_code = response.recorded_status();
        tracing::debug!("{} {} -> {}", method.as_str(), url, status_code);

        StatusUpdate {
            row_index: row.row_index,
            checked_on: today,
            status_code,
            redirect_url: detect_redirect(url, &response.final_url),
            error: response.recorded_error(),
        }
    }

    /// Writes all pending updates in one batch
    async fn flush(
        &mut self,
        limiter: &mut RateLimiter,
        report: &mut HealthCheckReport,
    ) -> crate::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let updates = self
            .pending
            .iter()
            .map(|update| update.to_range_update(&self.links_status))
            .collect::<Result<Vec<RangeUpdate>, _>>()?;

        tracing::info!(
            "Writing {} status updates to {}",
            updates.len(),
            self.links_status
        );
        limiter.acquire().await;
        self.store.batch_update(updates).await?;

        report.flushes += 1;
        report.rows_written += self.pending.len() as u64;
        self.pending.clear();
        Ok(())
    }
}

fn limit_reached(options: &HealthCheckOptions, report: &HealthCheckReport) -> bool {
    options.max_links > 0 && report.probed >= options.max_links
}
