//! Rows of the check queue and the updates written back for them

use crate::store::{RangeSpec, RangeUpdate, Row};
use crate::UrlResult;
use chrono::{Datelike, NaiveDate};

/// One row of the check queue
///
/// Queue columns: A status row index, B URL, C last checked, D last redirect,
/// E last error, F last status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    /// Row of this link in the status sheet
    pub row_index: u64,
    pub url: String,
    pub last_checked: String,
    pub last_redirect_url: String,
    pub last_error: String,

    /// 0 when the link has never been checked
    pub last_status_code: u16,
}

impl StatusRow {
    /// Parses a queue row; returns None when the row index is unusable
    pub fn from_row(row: &Row) -> Option<Self> {
        let cell = |i: usize| row.get(i).map(|c| c.trim().to_string()).unwrap_or_default();

        let row_index = parse_number(&cell(0)).filter(|n| *n >= 1.0)? as u64;

        Some(Self {
            row_index,
            url: cell(1),
            last_checked: cell(2),
            last_redirect_url: cell(3),
            last_error: cell(4),
            last_status_code: parse_number(&cell(5))
                .map(|n| n.clamp(0.0, u16::MAX as f64) as u16)
                .unwrap_or(0),
        })
    }
}

/// Returns the URL cell of a raw queue row
pub fn url_cell(row: &Row) -> &str {
    row.get(1).map(|c| c.trim()).unwrap_or_default()
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Result of one probe, waiting to be written to the status sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub row_index: u64,
    pub checked_on: NaiveDate,
    pub status_code: u16,
    pub redirect_url: String,
    pub error: String,
}

impl StatusUpdate {
    /// Cells written to columns E:H of the status row
    pub fn to_row(&self) -> Row {
        vec![
            date_formula(self.checked_on),
            self.status_code.to_string(),
            self.redirect_url.clone(),
            self.error.clone(),
        ]
    }

    /// Builds the range update for the status sheet named `sheet`
    pub fn to_range_update(&self, sheet: &str) -> UrlResult<RangeUpdate> {
        Ok(RangeUpdate {
            range: RangeSpec::rows(sheet, "E", "H", self.row_index, self.row_index)?,
            rows: vec![self.to_row()],
        })
    }
}

/// Sheet formula for a date, e.g. `=DATE(2024,3,7)`
pub fn date_formula(date: NaiveDate) -> String {
    format!("=DATE({},{},{})", date.year(), date.month(), date.day())
}
