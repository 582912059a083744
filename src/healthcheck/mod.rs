//! Link health check pipeline
//!
//! Pages through the check queue sheet, probes at most one link per domain
//! per run, and writes the results to the status sheet in batches.

mod checker;
mod cursor;
mod status;

pub use checker::{HealthCheckOptions, HealthCheckReport, HealthChecker, StopReason};
pub use cursor::{HealthCheckCursor, FIRST_DATA_ROW};
pub use status::{date_formula, StatusRow, StatusUpdate};
