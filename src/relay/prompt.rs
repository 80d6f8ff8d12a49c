//! Prompt construction for the search-grounded model call.
//!
//! The contract the prompt tries to impose: web search on, only the requested
//! indicators, one JSON object under a `data` key, one record per month,
//! `null` for unavailable values, no prose outside the JSON. The extraction
//! layer assumes none of this is guaranteed.

use std::fmt::Write as _;

use crate::catalog::{IndicatorKey, PRIMARY_SOURCES};

/// How much history and forecast the prompt asks for.
#[derive(Debug, Clone, Copy)]
pub struct PromptWindow {
    pub history_months: u32,
    pub forecast_quarters: u32,
}

impl Default for PromptWindow {
    fn default() -> Self {
        Self {
            history_months: 12,
            forecast_quarters: 4,
        }
    }
}

pub fn build_prompt(requested: &[IndicatorKey], window: PromptWindow) -> String {
    let mut indicator_lines = String::new();
    for key in requested {
        let meta = key.metadata();
        let _ = writeln!(
            indicator_lines,
            "- \"{}\": {} ({})",
            key.as_str(),
            meta.name,
            meta.unit
        );
    }

    let example_key = requested
        .first()
        .map(IndicatorKey::as_str)
        .unwrap_or("gdpGrowth");

    format!(
        "You are a research assistant compiling Philippine macroeconomic statistics.\n\
         Use web search to find the latest official figures, preferring these sources: {sources}.\n\
         \n\
         Report ONLY the following indicators, using exactly these JSON keys:\n\
         {indicators}\
         \n\
         Cover the most recent {history} months of published data, then append \
         quarter-end projections for the next {forecast} quarters.\n\
         \n\
         Respond with ONE JSON object and nothing else - no prose, no markdown, \
         no code fences. The object must have a single \"data\" key holding an \
         array with one record per month. Each record carries:\n\
         - \"month\": the month label, formatted YYYY-MM\n\
         - \"type\": \"Historical\" for published figures, \"Forecast\" for projections\n\
         - one number per requested indicator key, or null when the figure is \
         not available for that month\n\
         \n\
         Example record: {{\"month\": \"2025-01\", \"type\": \"Historical\", \"{example}\": 5.7}}",
        sources = PRIMARY_SOURCES.join(", "),
        indicators = indicator_lines,
        history = window.history_months,
        forecast = window.forecast_quarters,
        example = example_key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_requested_keys_only() {
        let prompt = build_prompt(
            &[IndicatorKey::GdpGrowth, IndicatorKey::InflationRate],
            PromptWindow::default(),
        );
        assert!(prompt.contains("\"gdpGrowth\""));
        assert!(prompt.contains("\"inflationRate\""));
        assert!(!prompt.contains("\"unemploymentRate\""));
    }

    #[test]
    fn prompt_steers_toward_primary_sources() {
        let prompt = build_prompt(&[IndicatorKey::PolicyRate], PromptWindow::default());
        assert!(prompt.contains("bsp.gov.ph"));
        assert!(prompt.contains("psa.gov.ph"));
    }

    #[test]
    fn prompt_reflects_the_window() {
        let prompt = build_prompt(
            &[IndicatorKey::GdpGrowth],
            PromptWindow {
                history_months: 24,
                forecast_quarters: 2,
            },
        );
        assert!(prompt.contains("24 months"));
        assert!(prompt.contains("next 2 quarters"));
    }
}
