//! Google Sheets v4 REST backend
//!
//! This module implements [`TabularStore`] on top of the spreadsheet values
//! API:
//! - `GET  values/{range}` for reads
//! - `POST values/{range}:clear` for clears
//! - `POST values/{range}:append` for appends
//! - `POST values:batchUpdate` for multi-range writes
//!
//! Every write uses `USER_ENTERED` input so formulas such as `=DATE(...)` are
//! evaluated by the sheet. Transient failures are retried here, with a
//! doubling delay, before an error is handed back to the pipelines.

use crate::store::traits::{StoreError, StoreResult, TabularStore};
use crate::store::{InsertMode, RangeSpec, RangeUpdate, ReadResult, Row};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Characters escaped when a range is placed in a URL path
const RANGE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'-')
    .remove(b'.')
    .remove(b'~');

const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Retry policy for transient store failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry; doubled for each later one
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

/// Tabular store backed by a Google spreadsheet
pub struct SheetsStore {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct ValueRangeBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    values: &'a [Row],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateBody<'a> {
    value_input_option: &'static str,
    data: Vec<ValueRangeBody<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<UpdateStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStats {
    #[serde(default)]
    updated_rows: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    total_updated_rows: usize,
}

impl SheetsStore {
    /// Creates a store for one spreadsheet
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every callout
    /// * `api_base` - API root, e.g. `https://sheets.googleapis.com/v4`
    /// * `spreadsheet_id` - The spreadsheet to address
    /// * `access_token` - OAuth bearer token
    /// * `retry` - Retry policy for transient failures
    pub fn new(
        client: Client,
        api_base: &str,
        spreadsheet_id: &str,
        access_token: &str,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            access_token: access_token.to_string(),
            retry,
        }
    }

    fn values_url(&self, range: &RangeSpec, suffix: &str) -> String {
        let encoded = utf8_percent_encode(&range.to_string(), RANGE_ESCAPE).to_string();
        format!(
            "{}/spreadsheets/{}/values/{}{}",
            self.api_base, self.spreadsheet_id, encoded, suffix
        )
    }

    /// Sends a request, retrying transient failures per the retry policy
    async fn send<F>(&self, build: F) -> StoreResult<Response>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut delay = self.retry.initial_delay;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let result = match build().bearer_auth(&self.access_token).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    StoreError::Api { status, body }
                }
                Err(e) => StoreError::Http(e),
            };

            if !result.is_transient() {
                return Err(result);
            }
            if attempt > self.retry.max_retries {
                return Err(StoreError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(result),
                });
            }

            tracing::warn!(
                "Store call failed (attempt {}/{}): {}; retrying in {:?}",
                attempt,
                self.retry.max_retries + 1,
                result,
                delay
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

#[async_trait]
impl TabularStore for SheetsStore {
    async fn clear_range(&self, range: &RangeSpec) -> StoreResult<()> {
        let url = self.values_url(range, ":clear");
        self.send(|| self.client.post(&url).json(&serde_json::json!({})))
            .await?;
        tracing::debug!("Cleared range {}", range);
        Ok(())
    }

    async fn get(&self, range: &RangeSpec) -> StoreResult<ReadResult> {
        let url = self.values_url(range, "");
        let response = self.send(|| self.client.get(&url)).await?;
        let body: ValueRangeResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let values = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();
        Ok(ReadResult::from_values(values))
    }

    async fn append(
        &self,
        range: &RangeSpec,
        rows: Vec<Row>,
        mode: InsertMode,
    ) -> StoreResult<usize> {
        let url = self.values_url(range, ":append");
        let body = ValueRangeBody {
            range: None,
            values: &rows,
        };
        let response = self
            .send(|| {
                self.client
                    .post(&url)
                    .query(&[
                        ("valueInputOption", VALUE_INPUT_OPTION),
                        ("insertDataOption", mode.as_api_str()),
                    ])
                    .json(&body)
            })
            .await?;

        let parsed: AppendResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(parsed.updates.map(|u| u.updated_rows).unwrap_or(rows.len()))
    }

    async fn batch_update(&self, updates: Vec<RangeUpdate>) -> StoreResult<usize> {
        let url = format!(
            "{}/spreadsheets/{}/values:batchUpdate",
            self.api_base, self.spreadsheet_id
        );
        let body = BatchUpdateBody {
            value_input_option: VALUE_INPUT_OPTION,
            data: updates
                .iter()
                .map(|u| ValueRangeBody {
                    range: Some(u.range.to_string()),
                    values: &u.rows,
                })
                .collect(),
        };

        let response = self.send(|| self.client.post(&url).json(&body)).await?;
        let parsed: BatchUpdateResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(parsed.total_updated_rows)
    }
}

/// Renders a JSON cell value as the string shown in the sheet
fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
