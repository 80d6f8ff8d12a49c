use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::catalog::{IndicatorKey, IndicatorMetadata, PRIMARY_SOURCES};
use crate::relay::{RelayError, RelayService};
use crate::types::FetchResult;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/economic-data", get(economic_data))
        .route("/api/indicators", get(indicators))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct EconomicDataQuery {
    /// Comma-separated wire names, e.g. `gdpGrowth,inflationRate`.
    #[serde(default)]
    indicators: Option<String>,
}

async fn economic_data(
    State(state): State<AppState>,
    Query(q): Query<EconomicDataQuery>,
) -> Result<Json<FetchResult>, RelayError> {
    let keys = parse_selection(q.indicators.as_deref().unwrap_or(""))?;
    let result = state.relay.fetch(&keys).await?;
    Ok(Json(result))
}

/// Parse and dedup the requested keys, preserving request order. Unknown
/// names and empty selections are validation failures, surfaced immediately.
fn parse_selection(raw: &str) -> Result<Vec<IndicatorKey>, RelayError> {
    let mut keys: Vec<IndicatorKey> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let key = part
            .parse::<IndicatorKey>()
            .map_err(|e| RelayError::Validation(e.to_string()))?;
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    if keys.is_empty() {
        return Err(RelayError::Validation(
            "select at least one indicator".to_string(),
        ));
    }
    Ok(keys)
}

#[derive(Serialize)]
struct CatalogEntry {
    key: IndicatorKey,
    #[serde(flatten)]
    metadata: &'static IndicatorMetadata,
}

#[derive(Serialize)]
struct CatalogOut {
    indicators: Vec<CatalogEntry>,
    primary_sources: &'static [&'static str],
}

/// Catalog dump for UI bootstrapping: drives the checkbox list, colors, and
/// the "where does this come from" footer.
async fn indicators() -> Json<CatalogOut> {
    let indicators = IndicatorKey::ALL
        .iter()
        .map(|&key| CatalogEntry {
            key,
            metadata: key.metadata(),
        })
        .collect();
    Json(CatalogOut {
        indicators,
        primary_sources: &PRIMARY_SOURCES,
    })
}
