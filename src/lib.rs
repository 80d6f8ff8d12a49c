// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod export;
pub mod metrics;
pub mod relay;
pub mod types;
pub mod view;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::catalog::IndicatorKey;
pub use crate::client::{EconomicDataClient, FetchError};
pub use crate::relay::{RelayError, RelayService};
pub use crate::types::{EconomicDataPoint, FetchResult, Source};

use tracing::info;

/// One-off smoke test of the relay against the real model, for use from the
/// entrypoint after tracing init. Never panics on failure; just logs.
///
/// ```ignore
/// if let Err(e) = peso_pulse::run_relay_quick_probe().await {
///     tracing::warn!(error = ?e, "relay quick probe didn't run");
/// }
/// ```
pub async fn run_relay_quick_probe() -> anyhow::Result<()> {
    let cfg = config::AppConfig::load(config::DEFAULT_CONFIG_PATH);
    let relay = RelayService::from_config(&cfg);
    if !relay.is_configured() {
        info!("relay quick probe skipped: no credential configured");
        return Ok(());
    }
    let out = relay.fetch(&[IndicatorKey::GdpGrowth]).await;
    match out {
        Ok(result) => info!(
            rows = result.data.len(),
            sources = result.sources.len(),
            "relay quick probe finished"
        ),
        Err(e) => info!(error = %e, "relay quick probe failed"),
    }
    Ok(())
}
