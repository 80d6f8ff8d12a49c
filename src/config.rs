//! Application configuration.
//!
//! Loaded once at startup from `config/dashboard.toml` with sane defaults
//! when the file is missing, plus `.env`/environment resolution for the
//! model credential. The credential is never written back to disk or logged.

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_history_months() -> u32 {
    12
}
fn default_forecast_quarters() -> u32 {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// "ENV" means: read the key from `GEMINI_API_KEY` at startup.
    /// Any other value is used verbatim (useful for local experiments only).
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Gemini model id used for every relay call.
    #[serde(default = "default_model")]
    pub model: String,

    /// Months of published history the prompt requests.
    #[serde(default = "default_history_months")]
    pub history_months: u32,

    /// Quarter-end projections appended after the history window.
    #[serde(default = "default_forecast_quarters")]
    pub forecast_quarters: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            model: default_model(),
            history_months: default_history_months(),
            forecast_quarters: default_forecast_quarters(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file. Falls back to defaults when the
    /// file is missing or malformed; a broken config file should degrade to
    /// "unconfigured", not crash the boot.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "malformed dashboard config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Resolve the model credential. `None` means the relay must refuse to
    /// dial out and report a configuration error instead.
    pub fn resolve_api_key(&self) -> Option<String> {
        let raw = self.api_key.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.eq_ignore_ascii_case("env") {
            return env::var(API_KEY_ENV)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }
        Some(raw.to_string())
    }
}
