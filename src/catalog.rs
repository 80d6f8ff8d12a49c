//! # Indicator Catalog
//!
//! Static registry of the macroeconomic series the dashboard can request,
//! keyed by a closed [`IndicatorKey`] enum.
//!
//! - Wire names are camelCase (`gdpGrowth`, `inflationRate`, ...) and
//!   round-trip through serde and [`IndicatorKey::from_str`].
//! - Metadata (display name, unit, chart color, optional outlook threshold)
//!   is defined once at startup and never mutated.
//! - `PRIMARY_SOURCES` lists the authoritative domains the search prompt
//!   steers the model toward.
//!
//! Everything else in the crate reads this module; nothing writes it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Closed set of requestable indicators. Adding a series means adding a
/// variant here plus one `seed` entry below.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorKey {
    GdpGrowth,
    InflationRate,
    UnemploymentRate,
    PesoDollarRate,
    PolicyRate,
    RemittanceGrowth,
    ExportGrowth,
    GrossReserves,
}

impl IndicatorKey {
    /// Every key, in catalog order. Drives the default selection and the
    /// checkbox list.
    pub const ALL: [IndicatorKey; 8] = [
        IndicatorKey::GdpGrowth,
        IndicatorKey::InflationRate,
        IndicatorKey::UnemploymentRate,
        IndicatorKey::PesoDollarRate,
        IndicatorKey::PolicyRate,
        IndicatorKey::RemittanceGrowth,
        IndicatorKey::ExportGrowth,
        IndicatorKey::GrossReserves,
    ];

    /// Wire name as it appears in JSON payloads and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKey::GdpGrowth => "gdpGrowth",
            IndicatorKey::InflationRate => "inflationRate",
            IndicatorKey::UnemploymentRate => "unemploymentRate",
            IndicatorKey::PesoDollarRate => "pesoDollarRate",
            IndicatorKey::PolicyRate => "policyRate",
            IndicatorKey::RemittanceGrowth => "remittanceGrowth",
            IndicatorKey::ExportGrowth => "exportGrowth",
            IndicatorKey::GrossReserves => "grossReserves",
        }
    }

    /// Display metadata for this key.
    pub fn metadata(&self) -> &'static IndicatorMetadata {
        CATALOG.get(self).expect("catalog seeds every key")
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKey {
    type Err = UnknownIndicator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndicatorKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownIndicator(s.to_string()))
    }
}

/// Returned when a wire name does not match any catalog key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown indicator '{0}'")]
pub struct UnknownIndicator(pub String);

/// Display metadata for one series.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorMetadata {
    /// Human-readable series name; doubles as the CSV column header.
    pub name: &'static str,
    pub unit: &'static str,
    /// Chart line/area color, hex.
    pub color: &'static str,
    /// Outlook threshold in the series' own unit, where one is meaningful.
    pub threshold: Option<f64>,
    /// What crossing the threshold means.
    pub threshold_note: Option<&'static str>,
}

/// Authoritative domains the search prompt asks the model to prefer.
pub const PRIMARY_SOURCES: [&str; 6] = [
    "psa.gov.ph",
    "bsp.gov.ph",
    "dof.gov.ph",
    "neda.gov.ph",
    "worldbank.org",
    "imf.org",
];

static CATALOG: Lazy<BTreeMap<IndicatorKey, IndicatorMetadata>> = Lazy::new(seed);

fn seed() -> BTreeMap<IndicatorKey, IndicatorMetadata> {
    let mut m = BTreeMap::new();

    m.insert(
        IndicatorKey::GdpGrowth,
        IndicatorMetadata {
            name: "GDP Growth",
            unit: "% y/y",
            color: "#0ea5e9",
            threshold: Some(6.0),
            threshold_note: Some("below the DBCC 6-7% full-year growth target"),
        },
    );
    m.insert(
        IndicatorKey::InflationRate,
        IndicatorMetadata {
            name: "Inflation Rate",
            unit: "% y/y",
            color: "#ef4444",
            threshold: Some(4.0),
            threshold_note: Some("above the BSP 2-4% target band"),
        },
    );
    m.insert(
        IndicatorKey::UnemploymentRate,
        IndicatorMetadata {
            name: "Unemployment Rate",
            unit: "%",
            color: "#f59e0b",
            threshold: Some(5.0),
            threshold_note: Some("above the 5% structural comfort level"),
        },
    );
    m.insert(
        IndicatorKey::PesoDollarRate,
        IndicatorMetadata {
            name: "Peso-Dollar Rate",
            unit: "PHP per USD",
            color: "#10b981",
            threshold: Some(58.0),
            threshold_note: Some("weaker than 58 to the US dollar"),
        },
    );
    m.insert(
        IndicatorKey::PolicyRate,
        IndicatorMetadata {
            name: "BSP Policy Rate",
            unit: "%",
            color: "#8b5cf6",
            threshold: None,
            threshold_note: None,
        },
    );
    m.insert(
        IndicatorKey::RemittanceGrowth,
        IndicatorMetadata {
            name: "OFW Remittance Growth",
            unit: "% y/y",
            color: "#ec4899",
            threshold: Some(0.0),
            threshold_note: Some("year-on-year contraction"),
        },
    );
    m.insert(
        IndicatorKey::ExportGrowth,
        IndicatorMetadata {
            name: "Export Growth",
            unit: "% y/y",
            color: "#14b8a6",
            threshold: Some(0.0),
            threshold_note: Some("year-on-year contraction"),
        },
    );
    m.insert(
        IndicatorKey::GrossReserves,
        IndicatorMetadata {
            name: "Gross International Reserves",
            unit: "USD bn",
            color: "#64748b",
            threshold: None,
            threshold_note: None,
        },
    );

    m
}
