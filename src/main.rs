//! Peso Pulse Binary Entrypoint
//! Boots the Axum relay serving Philippine economic indicator data,
//! wiring routes, shared state, and the Prometheus endpoint.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use peso_pulse::api::{self, AppState};
use peso_pulse::config::{AppConfig, DEFAULT_CONFIG_PATH};
use peso_pulse::metrics::Metrics;
use peso_pulse::relay::RelayService;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - PESO_PULSE_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("PESO_PULSE_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("peso_pulse=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This is where
    // GEMINI_API_KEY usually comes from on a laptop.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let cfg = AppConfig::load(DEFAULT_CONFIG_PATH);
    let relay = RelayService::from_config(&cfg);
    tracing::info!(
        provider = relay.provider_name(),
        configured = relay.is_configured(),
        model = %cfg.model,
        "relay initialized"
    );

    let metrics = Metrics::init();

    let state = AppState {
        relay: Arc::new(relay),
    };
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
