//! Summarization through the Gemini API.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait for a single prompt/response exchange
//! - [`GeminiClient`]: `generateContent` REST implementation of [`AskAsync`]
//! - [`summarize`]: builds the newsletter prompt, asks once, and cleans the
//!   returned HTML
//!
//! There is no retry: a failed call ends the run without sending email.

use crate::config::Config;
use crate::errors::DigestError;
use crate::models::{Digest, ExtractedDocument, digest_context};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Public Gemini API host.
pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

const MODEL_TIMEOUT: Duration = Duration::from_secs(120);

/// Trait for async LLM interaction.
///
/// Implementors send a prompt to a model and return its answer. The
/// orchestrator only depends on this trait, so tests substitute a canned
/// responder for the real API.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send `text` to the model and wait for the complete answer.
    async fn ask(&self, text: &str) -> Result<Self::Response, DigestError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, DigestError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(DigestError::Model(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(DigestError::Model(format!(
                "empty response (finish reason {})",
                reason
            )));
        }
        Ok(text)
    }
}

/// Gemini `generateContent` client.
///
/// A missing API key is only reported when the client is asked something,
/// so discovery and extraction still run (and log) without one.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, DigestError> {
        Self::with_base_url(config, GEMINI_ENDPOINT)
    }

    /// Create a client that talks to `base_url` instead of the public API.
    pub fn with_base_url(config: &Config, base_url: &str) -> Result<Self, DigestError> {
        let client = Client::builder().timeout(MODEL_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key: config.api_key().ok().map(str::to_string),
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl AskAsync for GeminiClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, DigestError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DigestError::Configuration("GEMINI_API_KEY".to_string()))?;

        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text }],
            }],
        };

        let t0 = Instant::now();
        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DigestError::Model(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = t0.elapsed().as_millis() as u64,
                %status,
                "Model API returned an error status"
            );
            return Err(DigestError::Model(format!(
                "HTTP {}: {}",
                status,
                truncate_for_log(&body, 300)
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DigestError::Parse(e.to_string()))?;
        let answer = parsed.into_text()?;
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = answer.chars().count(),
            "Model answered"
        );
        Ok(answer)
    }
}

/// Build the newsletter-editor prompt for `topic` around the documents' text.
pub fn build_prompt(topic: &str, documents: &[ExtractedDocument]) -> String {
    format!(
        r#"
You are the editor of a newsletter about {topic}.
Use the texts below to write a summary.

TEXTS:
{context}

IMPORTANT:
- Return ONLY the HTML code (no ```html at the start, just the raw code).
- Use <h2> tags for titles, <p> for text and <a> for links.
- Keep the layout clean and easy to read.
- At the end, add a funny farewell line.
"#,
        topic = topic,
        context = digest_context(documents)
    )
}

/// Remove every opening and closing markdown HTML fence from model output.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```html", "").replace("```", "")
}

/// Ask the model for an HTML digest of `documents`.
///
/// Callers must not pass an empty slice; the pipeline ends the run before
/// this point when nothing was extracted.
///
/// # Arguments
///
/// * `model` - The language model client
/// * `topic` - Topic named in the prompt
/// * `documents` - Extracted article texts, in discovery order
///
/// # Returns
///
/// The model's HTML with every markdown code fence removed.
///
/// # Errors
///
/// Whatever the model call reports: [`DigestError::Configuration`] without
/// an API key, [`DigestError::Network`] or [`DigestError::Model`] otherwise.
#[instrument(level = "info", skip_all, fields(%topic, documents = documents.len()))]
pub async fn summarize<A>(
    model: &A,
    topic: &str,
    documents: &[ExtractedDocument],
) -> Result<Digest, DigestError>
where
    A: AskAsync<Response = String>,
{
    let prompt = build_prompt(topic, documents);
    debug!(prompt_chars = prompt.chars().count(), "Built summary prompt");

    let raw = model.ask(&prompt).await?;
    let html = strip_code_fences(&raw);
    debug!(preview = %truncate_for_log(&html, 200), "Digest HTML");
    Ok(Digest { html })
}
