//! Best-effort extraction of structured data from a free-form model reply.
//!
//! The model is instructed to answer with one bare JSON object, but nothing
//! contractually holds it to that, so the reply is mined rather than parsed
//! directly: strip a fenced code block if one is present, otherwise take the
//! substring between the first `{` and the last `}`. Failures surface as
//! parse errors with the underlying parser message attached.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::relay::provider::GroundingChunk;
use crate::types::{EconomicDataPoint, Source};

static RE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("fence regex"));

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));

/// Locate the JSON object candidate inside a raw reply. Returns `None` when
/// the text holds neither a fenced block nor a `{...}` span.
pub fn extract_json_block(raw: &str) -> Option<&str> {
    if let Some(caps) = RE_FENCE.captures(raw) {
        let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if !inner.is_empty() {
            return Some(inner);
        }
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Parse the reply text into data rows. The error string carries the parser
/// diagnosis and becomes the `Parse` relay error; callers log the raw text.
pub fn parse_data_rows(reply_text: &str) -> Result<Vec<EconomicDataPoint>, String> {
    let block = extract_json_block(reply_text)
        .ok_or_else(|| "no JSON object found in model reply".to_string())?;

    let value: Value =
        serde_json::from_str(block).map_err(|e| format!("invalid JSON in model reply: {e}"))?;

    let rows = value
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| "model reply has no 'data' array".to_string())?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let obj = row
            .as_object()
            .ok_or_else(|| "'data' contains a non-object record".to_string())?;
        out.push(EconomicDataPoint::from_raw(obj)?);
    }
    Ok(out)
}

/// Reduce grounding chunks to a deduplicated citation list. Chunks missing a
/// title or URI are dropped; for a repeated URI the last chunk wins while the
/// list keeps first-appearance order.
pub fn dedup_sources(chunks: Vec<GroundingChunk>) -> Vec<Source> {
    let mut out: Vec<Source> = Vec::new();
    for chunk in chunks {
        let Some(web) = chunk.web else { continue };
        let (Some(title), Some(uri)) = (web.title, web.uri) else {
            continue;
        };
        let title = normalize_title(&title);
        if title.is_empty() || uri.is_empty() {
            continue;
        }
        match out.iter_mut().find(|s| s.uri == uri) {
            Some(existing) => existing.title = title,
            None => out.push(Source { title, uri }),
        }
    }
    out
}

/// Citation titles come from scraped pages; decode entities and collapse
/// whitespace before display.
fn normalize_title(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    RE_WS.replace_all(decoded.trim(), " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::provider::WebCitation;

    fn chunk(title: &str, uri: &str) -> GroundingChunk {
        GroundingChunk {
            web: Some(WebCitation {
                title: Some(title.to_string()),
                uri: Some(uri.to_string()),
            }),
        }
    }

    #[test]
    fn extracts_fenced_block() {
        let raw = "Sure! Here is the data:\n```json\n{\"data\": []}\n```\nHope this helps.";
        assert_eq!(extract_json_block(raw), Some("{\"data\": []}"));
    }

    #[test]
    fn extracts_outermost_braces_without_fence() {
        let raw = "preamble {\"data\": [{\"month\": \"2025-01\"}]} trailing note";
        assert_eq!(
            extract_json_block(raw),
            Some("{\"data\": [{\"month\": \"2025-01\"}]}")
        );
    }

    #[test]
    fn no_braces_yields_none() {
        assert_eq!(extract_json_block("I could not find any data."), None);
        assert_eq!(extract_json_block("} mismatched {"), None);
    }

    #[test]
    fn missing_data_array_is_an_error() {
        let err = parse_data_rows("{\"rows\": []}").unwrap_err();
        assert!(err.contains("'data'"));
    }

    #[test]
    fn grounding_dedup_last_write_wins() {
        let sources = dedup_sources(vec![
            chunk("BSP", "https://bsp.gov.ph"),
            chunk("PSA", "https://psa.gov.ph"),
            chunk("BSP Statistics", "https://bsp.gov.ph"),
        ]);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].uri, "https://bsp.gov.ph");
        assert_eq!(sources[0].title, "BSP Statistics");
        assert_eq!(sources[1].title, "PSA");
    }

    #[test]
    fn chunks_without_both_fields_are_dropped() {
        let partial = GroundingChunk {
            web: Some(WebCitation {
                title: Some("no uri".into()),
                uri: None,
            }),
        };
        let empty = GroundingChunk { web: None };
        assert!(dedup_sources(vec![partial, empty]).is_empty());
    }

    #[test]
    fn titles_are_entity_decoded_and_collapsed() {
        let sources = dedup_sources(vec![chunk(
            "Inflation &amp; Prices \n  Monitor",
            "https://psa.gov.ph/prices",
        )]);
        assert_eq!(sources[0].title, "Inflation & Prices Monitor");
    }
}
