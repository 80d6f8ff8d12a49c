//! Model provider abstraction + the production Gemini implementation.
//!
//! The relay only needs two things from a provider: the reply text and any
//! grounding citations. Everything Gemini-specific (endpoint, wire structs,
//! the `google_search` tool) stays behind [`ModelProvider`] so tests can
//! script replies without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// What a provider call can fail with. `Api` keeps the upstream status so the
/// relay can report it; transport failures collapse into `Http`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned status {status}: {message}")]
    Api { status: u16, message: String },
}

/// Reply text plus whatever grounding metadata the model attached.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: String,
    pub grounding: Vec<GroundingChunk>,
}

/// One grounding citation chunk; both inner fields are optional on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebCitation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebCitation {
    pub title: Option<String>,
    pub uri: Option<String>,
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ModelReply, ProviderError>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Gemini `generateContent` with the `google_search` tool enabled.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("peso-pulse/0.1 (+economic indicator relay)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(45))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Tool {
    google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<ModelReply, ProviderError> {
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);
        let req = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            tools: vec![Tool {
                google_search: serde_json::Map::new(),
            }],
        };

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("model call failed")
                        .to_string()
                });
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = resp.json().await?;
        let Some(candidate) = body.candidates.into_iter().next() else {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: "model reply carried no candidates".to_string(),
            });
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        let grounding = candidate
            .grounding_metadata
            .map(|g| g.grounding_chunks)
            .unwrap_or_default();

        debug!(
            chars = text.len(),
            grounding = grounding.len(),
            "gemini reply received"
        );

        Ok(ModelReply { text, grounding })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Stands in when the relay boots without a credential. Reaching it is a
/// wiring bug; it refuses rather than calling out.
pub struct NullProvider;

#[async_trait]
impl ModelProvider for NullProvider {
    async fn generate(&self, _prompt: &str) -> Result<ModelReply, ProviderError> {
        Err(ProviderError::Api {
            status: 500,
            message: "no model provider configured".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Scripted provider for tests: pops queued outcomes and counts calls, so
/// tests can assert both behavior and that no call was attempted.
pub struct ScriptedProvider {
    replies: Mutex<Vec<Result<ModelReply, ProviderError>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<ModelReply, ProviderError>>) -> Self {
        let mut replies = replies;
        replies.reverse(); // pop() serves them in submission order
        Self {
            replies: Mutex::new(replies),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_text(text: &str) -> Self {
        Self::new(vec![Ok(ModelReply {
            text: text.to_string(),
            grounding: Vec::new(),
        })])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn generate(&self, _prompt: &str) -> Result<ModelReply, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .expect("script lock")
            .pop()
            .unwrap_or_else(|| {
                Err(ProviderError::Api {
                    status: 500,
                    message: "script exhausted".to_string(),
                })
            })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
