//! In-process tabular store
//!
//! Keeps every sheet as a grid of strings and follows the same read rules as
//! the remote store (trailing blanks trimmed, no-data marker detected). It
//! also records each callout so tests can assert on batching.

use crate::store::traits::{StoreError, StoreResult, TabularStore};
use crate::store::{InsertMode, RangeSpec, RangeUpdate, ReadResult, Row};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A callout received by the memory store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Clear(String),
    Get(String),
    Append { range: String, rows: usize },
    BatchUpdate { ranges: usize, rows: usize },
}

#[derive(Debug, Default)]
struct Inner {
    sheets: HashMap<String, Vec<Row>>,
    calls: Vec<StoreCall>,
    failing_batch_updates: u32,
}

/// Tabular store kept in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents of a sheet; row 1 of the sheet is `rows[0]`
    pub fn set_sheet(&self, name: &str, rows: Vec<Row>) {
        self.lock().sheets.insert(name.to_string(), rows);
    }

    /// Returns a copy of a sheet's contents
    pub fn sheet(&self, name: &str) -> Vec<Row> {
        self.lock().sheets.get(name).cloned().unwrap_or_default()
    }

    /// Returns every callout received so far
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Makes the next `count` batch updates fail with a 503
    pub fn fail_next_batch_updates(&self, count: u32) {
        self.lock().failing_batch_updates = count;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn read(&self, range: &RangeSpec) -> Vec<Row> {
        let Some(rows) = self.sheets.get(&range.sheet) else {
            return Vec::new();
        };

        let start = range.first_row.unwrap_or(1).saturating_sub(1) as usize;
        let end = range
            .last_row
            .map(|r| r as usize)
            .unwrap_or(rows.len())
            .min(rows.len());

        let mut values: Vec<Row> = (start..end.max(start))
            .map(|i| {
                let row = &rows[i];
                let mut cells: Row = (range.first_column..=range.last_column)
                    .map(|c| row.get(c as usize).cloned().unwrap_or_default())
                    .collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while values.last().is_some_and(|row| row.is_empty()) {
            values.pop();
        }
        values
    }

    fn write(&mut self, sheet: &str, row_index: usize, column: usize, values: &[String]) {
        let rows = self.sheets.entry(sheet.to_string()).or_default();
        if rows.len() <= row_index {
            rows.resize(row_index + 1, Vec::new());
        }
        let row = &mut rows[row_index];
        if row.len() < column + values.len() {
            row.resize(column + values.len(), String::new());
        }
        row[column..column + values.len()].clone_from_slice(values);
    }

    fn table_end(&self, range: &RangeSpec) -> usize {
        let start = range.first_row.unwrap_or(1).saturating_sub(1) as usize;
        let Some(rows) = self.sheets.get(&range.sheet) else {
            return start;
        };

        rows.iter()
            .enumerate()
            .skip(start)
            .filter(|(_, row)| row.iter().any(|c| !c.is_empty()))
            .map(|(i, _)| i + 1)
            .last()
            .unwrap_or(start)
    }
}

#[async_trait]
impl TabularStore for MemoryStore {
    async fn clear_range(&self, range: &RangeSpec) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Clear(range.to_string()));

        if let Some(rows) = inner.sheets.get_mut(&range.sheet) {
            let start = range.first_row.unwrap_or(1).saturating_sub(1) as usize;
            let end = range.last_row.map(|r| r as usize).unwrap_or(rows.len());
            for row in rows.iter_mut().take(end).skip(start) {
                for c in range.first_column..=range.last_column {
                    if let Some(cell) = row.get_mut(c as usize) {
                        cell.clear();
                    }
                }
            }
        }
        Ok(())
    }

    async fn get(&self, range: &RangeSpec) -> StoreResult<ReadResult> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Get(range.to_string()));
        Ok(ReadResult::from_values(inner.read(range)))
    }

    async fn append(
        &self,
        range: &RangeSpec,
        rows: Vec<Row>,
        mode: InsertMode,
    ) -> StoreResult<usize> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Append {
            range: range.to_string(),
            rows: rows.len(),
        });

        let at = inner.table_end(range);
        match mode {
            InsertMode::InsertRows => {
                let sheet = inner.sheets.entry(range.sheet.clone()).or_default();
                if sheet.len() > at {
                    for offset in 0..rows.len() {
                        sheet.insert(at + offset, Vec::new());
                    }
                }
            }
        }
        for (offset, row) in rows.iter().enumerate() {
            inner.write(&range.sheet, at + offset, range.first_column as usize, row);
        }
        Ok(rows.len())
    }

    async fn batch_update(&self, updates: Vec<RangeUpdate>) -> StoreResult<usize> {
        let mut inner = self.lock();
        if inner.failing_batch_updates > 0 {
            inner.failing_batch_updates -= 1;
            return Err(StoreError::Api {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }

        let total: usize = updates.iter().map(|u| u.rows.len()).sum();
        inner.calls.push(StoreCall::BatchUpdate {
            ranges: updates.len(),
            rows: total,
        });

        for update in &updates {
            let start = update.range.first_row.unwrap_or(1).saturating_sub(1) as usize;
            for (offset, row) in update.rows.iter().enumerate() {
                inner.write(
                    &update.range.sheet,
                    start + offset,
                    update.range.first_column as usize,
                    row,
                );
            }
        }
        Ok(total)
    }
}
