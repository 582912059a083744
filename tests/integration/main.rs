//! Integration tests for the sync and health check pipelines
//!
//! These tests drive the pipelines end to end against a SQLite source on
//! disk, the in-memory store, and wiremock servers standing in for the
//! spreadsheet API and the probed sites.

mod export_tests;
mod healthcheck_tests;
mod sheets_tests;
