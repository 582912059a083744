use crate::{UrlError, UrlResult};
use std::fmt;

/// A rectangular, A1-addressed range within one sheet
///
/// Columns are zero-based internally and rendered as letters; rows are
/// one-based as in the sheet. A missing row bound leaves the range open on
/// that side (`ALL_LINKS!A2:C` runs to the last row).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeSpec {
    /// Sheet (tab) name
    pub sheet: String,

    /// First column, zero-based
    pub first_column: u32,

    /// Last column, zero-based and inclusive
    pub last_column: u32,

    /// First row, one-based (None = row 1)
    pub first_row: Option<u64>,

    /// Last row, one-based and inclusive (None = open ended)
    pub last_row: Option<u64>,
}

impl RangeSpec {
    /// Whole columns, e.g. `SHEET!A:ZZZ`
    pub fn columns(sheet: &str, first: &str, last: &str) -> UrlResult<Self> {
        Ok(Self {
            sheet: sheet.to_string(),
            first_column: column_index(first)?,
            last_column: column_index(last)?,
            first_row: None,
            last_row: None,
        })
    }

    /// Columns starting at a row and running to the end, e.g. `SHEET!A2:C`
    pub fn from_row(sheet: &str, first: &str, last: &str, first_row: u64) -> UrlResult<Self> {
        let mut range = Self::columns(sheet, first, last)?;
        range.first_row = Some(first_row);
        Ok(range)
    }

    /// A bounded block of rows, e.g. `SHEET!A2:F1001`
    pub fn rows(
        sheet: &str,
        first: &str,
        last: &str,
        first_row: u64,
        last_row: u64,
    ) -> UrlResult<Self> {
        let mut range = Self::from_row(sheet, first, last, first_row)?;
        range.last_row = Some(last_row);
        Ok(range)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = !self
            .sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if quote {
            write!(f, "'{}'!", self.sheet)?;
        } else {
            write!(f, "{}!", self.sheet)?;
        }

        write!(f, "{}", column_letters(self.first_column))?;
        if let Some(row) = self.first_row {
            write!(f, "{}", row)?;
        }
        write!(f, ":{}", column_letters(self.last_column))?;
        if let Some(row) = self.last_row {
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

/// Converts column letters (`A`, `Z`, `AA`, `ZZZ`) to a zero-based index
pub fn column_index(letters: &str) -> UrlResult<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return Err(UrlError::InvalidColumn(letters.to_string()));
    }

    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(UrlError::InvalidColumn(letters.to_string()));
        }
        index = index * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    Ok(index - 1)
}

/// Converts a zero-based column index to letters
pub fn column_letters(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
