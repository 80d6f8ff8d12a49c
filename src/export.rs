//! CSV export of the currently loaded rows for the selected indicators.
//!
//! Header: `Month` followed by each selected series' display name, quoted.
//! Rows: quoted month label, then the reading or an empty cell when the
//! value is null/absent. Names come from the static catalog, so quoting is
//! the only escaping needed.

use crate::catalog::IndicatorKey;
use crate::types::EconomicDataPoint;

pub const EXPORT_FILE_NAME: &str = "ph-economic-indicators.csv";

/// Build the CSV blob for `rows` restricted to `selected`, in selection
/// order. Callers only invoke this with loaded data; an empty `rows` still
/// yields a valid header-only file.
pub fn to_csv(rows: &[EconomicDataPoint], selected: &[IndicatorKey]) -> String {
    let mut out = String::new();

    out.push_str("Month");
    for key in selected {
        out.push_str(",\"");
        out.push_str(key.metadata().name);
        out.push('"');
    }
    out.push('\n');

    for row in rows {
        out.push('"');
        out.push_str(&row.month);
        out.push('"');
        for key in selected {
            out.push(',');
            if let Some(v) = row.value(*key) {
                out.push_str(&v.to_string());
            }
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn row(month: &str, entries: &[(IndicatorKey, Option<f64>)]) -> EconomicDataPoint {
        EconomicDataPoint {
            month: month.to_string(),
            kind: None,
            values: entries.iter().copied().collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn header_lists_selected_names_in_selection_order() {
        let selected = [IndicatorKey::InflationRate, IndicatorKey::GdpGrowth];
        let csv = to_csv(&[], &selected);
        assert_eq!(csv, "Month,\"Inflation Rate\",\"GDP Growth\"\n");
    }

    #[test]
    fn header_property_holds_for_every_nonempty_selection_prefix() {
        for n in 1..=IndicatorKey::ALL.len() {
            let selected = &IndicatorKey::ALL[..n];
            let csv = to_csv(&[], selected);
            let header = csv.lines().next().unwrap();
            let mut expected = String::from("Month");
            for key in selected {
                expected.push_str(&format!(",\"{}\"", key.metadata().name));
            }
            assert_eq!(header, expected);
        }
    }

    #[test]
    fn absent_and_null_values_become_empty_cells() {
        let rows = vec![row(
            "2025-01",
            &[
                (IndicatorKey::GdpGrowth, Some(5.7)),
                (IndicatorKey::InflationRate, None),
            ],
        )];
        let selected = [
            IndicatorKey::GdpGrowth,
            IndicatorKey::InflationRate,
            IndicatorKey::PolicyRate,
        ];
        let csv = to_csv(&rows, &selected);
        let data_line = csv.lines().nth(1).unwrap();
        assert_eq!(data_line, "\"2025-01\",5.7,,");
    }

    #[test]
    fn months_are_quoted() {
        let rows = vec![row("Jan 2025", &[(IndicatorKey::GdpGrowth, Some(6.1))])];
        let csv = to_csv(&rows, &[IndicatorKey::GdpGrowth]);
        assert!(csv.contains("\"Jan 2025\",6.1"));
    }
}
