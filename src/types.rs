//! Core data contract exchanged between the relay, the fetch client, and the
//! dashboard: monthly data points keyed by the closed indicator set, plus the
//! web sources the model claims to have consulted.
//!
//! Rows arrive from a generative model, so deserialization is deliberately
//! lenient: unknown keys are ignored, `null` means "unavailable", and numeric
//! strings are coerced. The one hard requirement is a recognizable `month`
//! label per row.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::catalog::IndicatorKey;

/// Whether a row is observed data or a model forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    Historical,
    Forecast,
}

/// One month of indicator readings. Keys absent from `values` were not
/// reported; keys present with `None` were reported as unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicDataPoint {
    /// Free-form month label, e.g. `2025-01` or `Jan 2025`.
    pub month: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PointKind>,
    #[serde(flatten)]
    pub values: BTreeMap<IndicatorKey, Option<f64>>,
}

impl EconomicDataPoint {
    pub fn value(&self, key: IndicatorKey) -> Option<f64> {
        self.values.get(&key).copied().flatten()
    }

    /// Lenient conversion from a raw JSON object. Fails only when the row
    /// carries no usable `month` label; everything else degrades to "absent".
    pub fn from_raw(raw: &serde_json::Map<String, Value>) -> Result<Self, String> {
        let month = raw
            .get("month")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| "record has no recognizable 'month' label".to_string())?
            .to_string();

        let kind = raw
            .get("type")
            .and_then(|v| serde_json::from_value::<PointKind>(v.clone()).ok());

        let mut values = BTreeMap::new();
        for (field, value) in raw {
            if field == "month" || field == "type" {
                continue;
            }
            // Keys outside the catalog are model noise; drop them.
            let Ok(key) = field.parse::<IndicatorKey>() else {
                continue;
            };
            values.insert(key, coerce_number(value));
        }

        Ok(Self {
            month,
            kind,
            values,
        })
    }
}

impl<'de> Deserialize<'de> for EconomicDataPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Map::deserialize(deserializer)?;
        EconomicDataPoint::from_raw(&raw).map_err(de::Error::custom)
    }
}

/// `number | null | numeric string` → reading; anything else is absent.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// A web citation the model grounded its answer on, uniqued by `uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Unit of exchange between relay and client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub data: Vec<EconomicDataPoint>,
    pub sources: Vec<Source>,
}

impl FetchResult {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Parse a month label into a sortable date. Accepted shapes:
/// `2025-01`, `2025-01-15`, `Jan 2025`, `January 2025`.
pub fn parse_month(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    if let Ok(d) = NaiveDate::parse_from_str(label, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%d %b %Y", "%d %B %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("01 {label}"), fmt) {
            return Some(d);
        }
    }
    None
}

/// Sort rows ascending by parsed month. Stable: unparseable labels sink to
/// the end in their original relative order, so sorting twice yields the
/// same sequence.
pub fn sort_by_month(data: &mut [EconomicDataPoint]) {
    data.sort_by_key(|p| {
        let key = parse_month(&p.month);
        (key.is_none(), key)
    });
}
