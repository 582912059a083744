//! Store module for the remote tabular store
//!
//! This module handles all reads and writes against the spreadsheet-style
//! store, including:
//! - A1 range addressing
//! - The `TabularStore` capability trait
//! - A Google Sheets v4 REST backend with its own retry policy
//! - An in-process backend used as a test double

mod memory;
mod range;
mod sheets;
mod traits;

pub use memory::{MemoryStore, StoreCall};
pub use range::{column_index, column_letters, RangeSpec};
pub use sheets::{RetryPolicy, SheetsStore};
pub use traits::{StoreError, StoreResult, TabularStore};

/// One row of cell values
pub type Row = Vec<String>;

/// Marker a store view returns when it has no rows to report
pub const NO_DATA_MARKER: &str = "#N/A";

/// Result of reading a range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    /// The rows found in the range (possibly none)
    Rows(Vec<Row>),

    /// The view explicitly reported that it has no data
    NoData,
}

impl ReadResult {
    /// Builds a read result from raw values, detecting the no-data marker
    pub fn from_values(values: Vec<Row>) -> Self {
        let is_marker = values
            .first()
            .and_then(|row| row.first())
            .is_some_and(|cell| cell.trim() == NO_DATA_MARKER);

        if is_marker {
            Self::NoData
        } else {
            Self::Rows(values)
        }
    }
}

/// How appended rows are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Insert new rows for the data
    InsertRows,
}

impl InsertMode {
    /// Returns the wire name of the mode
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::InsertRows => "INSERT_ROWS",
        }
    }
}

/// Values to write into one range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeUpdate {
    pub range: RangeSpec,
    pub rows: Vec<Row>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_no_data_marker_detected() {
        let result = ReadResult::from_values(vec![row(&["#N/A"])]);
        assert_eq!(result, ReadResult::NoData);
    }

    #[test]
    fn test_empty_values_are_rows() {
        let result = ReadResult::from_values(Vec::new());
        assert_eq!(result, ReadResult::Rows(Vec::new()));
    }

    #[test]
    fn test_regular_values() {
        let result = ReadResult::from_values(vec![row(&["https://a.example/"])]);
        assert_eq!(result, ReadResult::Rows(vec![row(&["https://a.example/"])]));
    }

    #[test]
    fn test_insert_mode_names() {
        assert_eq!(InsertMode::InsertRows.as_api_str(), "INSERT_ROWS");
    }
}
