//! Export pagination state

/// Watermark over the source identifiers exported in the current run
///
/// The ceiling is the highest identifier present when the run started. Rows
/// added to the source after that point are left for the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportCursor {
    last_exported_id: i64,
    ceiling: i64,
    chunk_size: usize,
}

impl ExportCursor {
    /// Creates a cursor that starts after `start_after`
    pub fn new(start_after: i64, ceiling: i64, chunk_size: usize) -> Self {
        Self {
            last_exported_id: start_after,
            ceiling,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn last_exported_id(&self) -> i64 {
        self.last_exported_id
    }

    pub fn ceiling(&self) -> i64 {
        self.ceiling
    }

    /// Returns true once the watermark has reached the ceiling
    pub fn is_exhausted(&self) -> bool {
        self.last_exported_id >= self.ceiling
    }

    /// Returns true if `source_id` was present when the run started
    pub fn within_ceiling(&self, source_id: i64) -> bool {
        source_id <= self.ceiling
    }

    /// Returns the next window as `(after_id, limit)`, capped by `remaining`
    pub fn window(&self, remaining: Option<u64>) -> (i64, usize) {
        let limit = match remaining {
            Some(remaining) => self.chunk_size.min(remaining as usize),
            None => self.chunk_size,
        };
        (self.last_exported_id, limit)
    }

    /// Moves the watermark to `source_id`; it never moves backwards
    pub fn advance(&mut self, source_id: i64) {
        if source_id > self.last_exported_id {
            self.last_exported_id = source_id;
        }
    }
}
