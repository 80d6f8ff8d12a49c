//! # Dashboard Controller
//!
//! Pure, testable state machine behind the indicator dashboard. No I/O here:
//! the surrounding UI drives it by starting fetches (which hand out
//! generation tickets) and resolving them with whatever the fetch client
//! returned. Stale tickets are dropped so overlapping fetches cannot clobber
//! newer state.
//!
//! Policy decisions baked in:
//! - toggling an indicator triggers an immediate automatic re-fetch;
//! - an empty selection is an error state, not an empty chart;
//! - the newest fetch generation always wins.

use serde_json::Value;

use crate::catalog::IndicatorKey;
use crate::relay::{extract, CONFIG_ERROR_MARKER};
use crate::types::{self, FetchResult};

/// The four UI states. `Empty` is a valid zero-row response, distinct from
/// `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    Error(String),
    Empty,
    Populated(FetchResult),
}

/// Opaque handle tying an in-flight fetch to the generation that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

pub const EMPTY_SELECTION_MESSAGE: &str = "Select at least one indicator.";

const SETUP_INSTRUCTIONS: &str = "The server is missing its Gemini API key. \
    Set GEMINI_API_KEY in the relay environment and restart the service.";

#[derive(Debug)]
pub struct Dashboard {
    selected: Vec<IndicatorKey>,
    state: DashboardState,
    generation: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Fresh dashboard with every catalog series selected. The caller is
    /// expected to start the mount fetch via [`Dashboard::begin_fetch`].
    pub fn new() -> Self {
        Self {
            selected: IndicatorKey::ALL.to_vec(),
            state: DashboardState::Loading,
            generation: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn selected(&self) -> &[IndicatorKey] {
        &self.selected
    }

    pub fn is_selected(&self, key: IndicatorKey) -> bool {
        self.selected.contains(&key)
    }

    /// Start a fetch: enter `Loading` and mint a ticket for this generation.
    /// Any still-unresolved older ticket is implicitly invalidated.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = DashboardState::Loading;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// User-initiated retry; identical to starting a fresh fetch.
    pub fn retry(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    /// Flip one indicator. A non-empty selection immediately re-fetches; an
    /// emptied selection lands in the error state without touching the
    /// network (and invalidates anything in flight).
    pub fn toggle_indicator(&mut self, key: IndicatorKey) -> Option<FetchTicket> {
        match self.selected.iter().position(|&k| k == key) {
            Some(idx) => {
                self.selected.remove(idx);
            }
            None => self.selected.push(key),
        }

        if self.selected.is_empty() {
            self.generation += 1;
            self.state = DashboardState::Error(EMPTY_SELECTION_MESSAGE.to_string());
            return None;
        }
        Some(self.begin_fetch())
    }

    /// Deliver a fetch outcome. Returns `false` when the ticket is stale
    /// (a newer fetch superseded it) and the outcome was dropped.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<FetchResult, String>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.state = match outcome {
            Ok(mut result) => {
                types::sort_by_month(&mut result.data);
                if result.is_empty() {
                    DashboardState::Empty
                } else {
                    DashboardState::Populated(result)
                }
            }
            Err(raw) => DashboardState::Error(format_error_message(&raw)),
        };
        true
    }

    /// Rows available for rendering/export, if any.
    pub fn rows(&self) -> Option<&FetchResult> {
        match &self.state {
            DashboardState::Populated(result) => Some(result),
            _ => None,
        }
    }
}

/// Cosmetic cleanup of a raw error string for display. Classification is
/// untouched - this only decides what the user reads.
///
/// Order: configuration marker (case-insensitive substring) → embedded JSON
/// `details`/`message` → the raw string verbatim.
pub fn format_error_message(raw: &str) -> String {
    if raw.to_lowercase().contains(&CONFIG_ERROR_MARKER.to_lowercase()) {
        return SETUP_INSTRUCTIONS.to_string();
    }

    if let Some(block) = extract::extract_json_block(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(block) {
            for field in ["details", "message"] {
                if let Some(msg) = value.get(field).and_then(Value::as_str) {
                    if !msg.trim().is_empty() {
                        return msg.to_string();
                    }
                }
            }
        }
    }

    raw.to_string()
}
