//! # Data Fetch Client
//!
//! Thin reqwest client for the relay endpoint. One network call per
//! invocation, no retries - a retry is the user re-invoking the fetch.
//! Transport failures, server-reported failures, and malformed payloads are
//! normalized into distinct [`FetchError`] variants that all render as a
//! single user-facing message.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::catalog::IndicatorKey;
use crate::types::{self, FetchResult};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Select at least one indicator.")]
    EmptySelection,

    /// The relay endpoint could not be reached at all.
    #[error("Could not reach the data service: {0}")]
    Connectivity(String),

    /// The relay answered with a non-2xx status and (maybe) an error body.
    #[error("The data service reported a failure: {message}")]
    Server { status: u16, message: String },

    /// 2xx, but the body is not the `{ data: [...], sources: [...] }` shape.
    #[error("The data service returned an unusable payload: {0}")]
    MalformedPayload(String),
}

pub struct EconomicDataClient {
    http: reqwest::Client,
    base_url: String,
}

impl EconomicDataClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(4))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the selected series. Rows come back sorted ascending by month,
    /// ready for rendering. Empty selections short-circuit without touching
    /// the network.
    pub async fn fetch_economic_data(
        &self,
        selected: &[IndicatorKey],
    ) -> Result<FetchResult, FetchError> {
        if selected.is_empty() {
            return Err(FetchError::EmptySelection);
        }

        let keys = selected
            .iter()
            .map(IndicatorKey::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/api/economic-data?indicators={keys}", self.base_url);
        debug!(%url, "fetching economic data");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Connectivity(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Connectivity(e.to_string()))?;

        if !status.is_success() {
            let message = mine_error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(FetchError::Server {
                status: status.as_u16(),
                message,
            });
        }

        parse_payload(&body)
    }
}

/// Validate and convert a 2xx body. Split out so payload handling is
/// testable without a socket.
fn parse_payload(body: &str) -> Result<FetchResult, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedPayload(format!("body is not JSON: {e}")))?;

    // The contract requires array-typed `data` and `sources` before any row
    // is looked at.
    if !value.get("data").is_some_and(Value::is_array) {
        return Err(FetchError::MalformedPayload(
            "response has no 'data' array".to_string(),
        ));
    }
    if !value.get("sources").is_some_and(Value::is_array) {
        return Err(FetchError::MalformedPayload(
            "response has no 'sources' array".to_string(),
        ));
    }

    let mut result: FetchResult = serde_json::from_value(value)
        .map_err(|e| FetchError::MalformedPayload(e.to_string()))?;
    types::sort_by_month(&mut result.data);
    Ok(result)
}

/// Mine a non-2xx JSON error body for `details`, then `message`.
fn mine_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for field in ["details", "message"] {
        if let Some(msg) = value.get(field).and_then(Value::as_str) {
            if !msg.trim().is_empty() {
                return Some(msg.to_string());
            }
        }
    }
    None
}
