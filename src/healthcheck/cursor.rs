/// First sheet row of the check queue (row 1 holds the headers)
pub const FIRST_DATA_ROW: u64 = 2;

/// Low-water mark over the check queue
///
/// Points at the first row not yet known to be skippable. It only moves past
/// skip rows that sit exactly at its position, so a row that still has to be
/// probed is never passed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthCheckCursor {
    first_non_skip_row: u64,
}

impl HealthCheckCursor {
    pub fn new() -> Self {
        Self::starting_at(FIRST_DATA_ROW)
    }

    pub fn starting_at(row: u64) -> Self {
        Self {
            first_non_skip_row: row,
        }
    }

    /// Sheet row the next page starts at
    pub fn position(&self) -> u64 {
        self.first_non_skip_row
    }

    /// Records the classification of the row at `row`
    ///
    /// Returns true if the cursor moved.
    pub fn observe(&mut self, row: u64, skippable: bool) -> bool {
        if skippable && row == self.first_non_skip_row {
            self.first_non_skip_row += 1;
            true
        } else {
            false
        }
    }
}

impl Default for HealthCheckCursor {
    fn default() -> Self {
        Self::new()
    }
}
