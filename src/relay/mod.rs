//! # Relay / Extraction Service
//!
//! Brokers between dashboard clients and the search-grounded generative
//! model: builds the prompt, makes exactly one provider call, mines the reply
//! for a JSON payload, and reduces grounding metadata to a citation list.
//! Stateless per call - no caching, no rate limiting, no retries.

pub mod extract;
pub mod prompt;
pub mod provider;

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::IndicatorKey;
use crate::config::{AppConfig, API_KEY_ENV};
use crate::relay::prompt::PromptWindow;
use crate::relay::provider::{GeminiProvider, ModelProvider, NullProvider, ProviderError};
use crate::types::FetchResult;

/// Marker phrase the client-side error formatter pattern-matches to render
/// setup instructions. Must stay in sync with [`RelayError::Configuration`]'s
/// display text.
pub const CONFIG_ERROR_MARKER: &str = "GEMINI_API_KEY is not configured";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("GEMINI_API_KEY is not configured on the server")]
    Configuration,

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("upstream model call failed (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("could not extract economic data from the model reply: {0}")]
    Parse(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream { .. } | RelayError::Parse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            RelayError::Configuration => "The server is missing its API credential.",
            RelayError::Validation(_) => "The request was invalid.",
            RelayError::Upstream { .. } => "The data provider could not be reached.",
            RelayError::Parse(_) => "The data provider returned an unusable reply.",
        }
    }
}

/// Wire shape of a relay failure: `{ message, details }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    details: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            message: self.summary().to_string(),
            details: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("relay_requests_total", "Economic data fetches attempted.");
        describe_counter!(
            "relay_parse_failures_total",
            "Model replies the extractor could not mine a payload from."
        );
        describe_counter!(
            "relay_upstream_errors_total",
            "Failed calls to the generative model API."
        );
        describe_histogram!("relay_model_call_ms", "Model call latency in milliseconds.");
    });
}

pub struct RelayService {
    provider: Arc<dyn ModelProvider>,
    window: PromptWindow,
    configured: bool,
}

impl RelayService {
    /// Relay backed by a ready provider (credential present).
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            window: PromptWindow::default(),
            configured: true,
        }
    }

    /// Relay wired up without a credential: every fetch fails fast with a
    /// configuration error and the provider is never called.
    pub fn unconfigured(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            window: PromptWindow::default(),
            configured: false,
        }
    }

    pub fn with_window(mut self, window: PromptWindow) -> Self {
        self.window = window;
        self
    }

    /// Build from configuration: resolves the credential and picks the real
    /// Gemini provider, or leaves the relay unconfigured when the key is
    /// absent so the failure surfaces per request instead of at boot.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let window = PromptWindow {
            history_months: cfg.history_months,
            forecast_quarters: cfg.forecast_quarters,
        };
        match cfg.resolve_api_key() {
            Some(key) => {
                Self::new(Arc::new(GeminiProvider::new(key, cfg.model.clone()))).with_window(window)
            }
            None => {
                warn!(
                    env = API_KEY_ENV,
                    "relay starting without a model credential"
                );
                Self::unconfigured(Arc::new(NullProvider)).with_window(window)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// One model round-trip for the requested indicators. The credential
    /// check precedes everything - an unconfigured relay never dials out.
    pub async fn fetch(&self, requested: &[IndicatorKey]) -> Result<FetchResult, RelayError> {
        ensure_metrics_described();

        if !self.configured {
            return Err(RelayError::Configuration);
        }
        if requested.is_empty() {
            return Err(RelayError::Validation(
                "select at least one indicator".to_string(),
            ));
        }

        counter!("relay_requests_total").increment(1);

        let prompt = prompt::build_prompt(requested, self.window);
        let started = Instant::now();
        let reply = self.provider.generate(&prompt).await.map_err(|e| {
            counter!("relay_upstream_errors_total").increment(1);
            match e {
                ProviderError::Api { status, message } => RelayError::Upstream { status, message },
                ProviderError::Http(err) => RelayError::Upstream {
                    status: 502,
                    message: err.to_string(),
                },
            }
        })?;
        histogram!("relay_model_call_ms").record(started.elapsed().as_millis() as f64);

        let data = extract::parse_data_rows(&reply.text).map_err(|msg| {
            counter!("relay_parse_failures_total").increment(1);
            // Raw reply stays in the logs, never in the client payload.
            debug!(raw = %reply.text, "model reply failed extraction");
            RelayError::Parse(msg)
        })?;

        let sources = extract::dedup_sources(reply.grounding);
        debug!(
            rows = data.len(),
            sources = sources.len(),
            provider = self.provider.name(),
            "relay fetch complete"
        );

        Ok(FetchResult { data, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_text_carries_the_marker() {
        let msg = RelayError::Configuration.to_string();
        assert!(msg.contains(CONFIG_ERROR_MARKER));
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            RelayError::Configuration.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::Upstream {
                status: 429,
                message: "quota".into()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            RelayError::Parse("bad".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
