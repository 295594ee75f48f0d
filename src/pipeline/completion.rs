//! Remote completion: drive the `generateContent` call and shape its reply.
//!
//! This module is intentionally thin — payload construction lives in
//! [`crate::pipeline::payload`] so it can change without touching the HTTP
//! or error-shaping logic here.
//!
//! The seam is [`CompletionClient`]: the session only ever talks to the
//! trait object, so tests substitute a scripted client and the whole
//! orchestrator runs without a network. No retry is attempted at this
//! layer; a failed call surfaces once, as a conversation turn.

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::pipeline::payload::{PayloadPart, PayloadRole};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Literal reply used when a 2xx response does not carry a readable
/// candidate. This is a *reply*, not an error: the upstream answered, we
/// just could not find text in it.
pub const UNRECOGNIZED_REPLY: &str = "Sorry, I couldn't understand that.";

/// A failed completion call.
///
/// The `Display` impl of each variant is the exact text the orchestrator
/// appends as the assistant's error turn, so the conversation never shows a
/// raw transport error.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The API answered with a non-2xx status.
    #[error("API request failed with status {0}")]
    Status(u16),

    /// The request never completed, or the response body was not readable.
    #[error("Oops! Something went wrong while getting the answer.")]
    Transport(#[from] reqwest::Error),
}

/// The remote completion capability: an ordered list of role-tagged turns
/// in, a reply string out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, payload: &[PayloadPart]) -> Result<String, CompletionError>;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<WireContent<'a>>,
}

#[derive(Serialize)]
struct WireContent<'a> {
    role: PayloadRole,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// First candidate's first text part, trimmed; `None` when the response
/// shape holds no usable text.
fn extract_reply(response: &GenerateResponse) -> Option<String> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()?
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

// ── HTTP client ──────────────────────────────────────────────────────────

/// [`CompletionClient`] backed by the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ChatError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        // The key rides in the query string, so this URL must never be logged.
        format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        )
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, payload: &[PayloadPart]) -> Result<String, CompletionError> {
        let request = GenerateRequest {
            contents: payload
                .iter()
                .map(|p| WireContent {
                    role: p.role,
                    parts: vec![WirePart { text: &p.text }],
                })
                .collect(),
        };

        debug!(
            "Requesting completion: model={}, {} payload elements",
            self.model,
            payload.len()
        );

        let response = self.http.post(self.endpoint()).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(extract_reply(&body).unwrap_or_else(|| UNRECOGNIZED_REPLY.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_error_display_is_the_conversation_text() {
        assert_eq!(
            CompletionError::Status(500).to_string(),
            "API request failed with status 500"
        );
        assert_eq!(
            CompletionError::Status(429).to_string(),
            "API request failed with status 429"
        );
    }

    #[tokio::test]
    async fn transport_error_display_is_the_conversation_text() {
        // An invalid URL fails inside the request builder, yielding a real
        // reqwest::Error without any network traffic.
        let err = reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .expect_err("invalid URL must not send");
        assert_eq!(
            CompletionError::from(err).to_string(),
            "Oops! Something went wrong while getting the answer."
        );
    }

    #[test]
    fn request_serialises_to_the_generate_content_shape() {
        let request = GenerateRequest {
            contents: vec![WireContent {
                role: PayloadRole::User,
                parts: vec![WirePart { text: "hi" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn extract_reply_takes_first_candidate_first_part_trimmed() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "  Hi there \n"}, {"text": "ignored"}]}},
                {"content": {"parts": [{"text": "second candidate"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(extract_reply(&response).as_deref(), Some("Hi there"));
    }

    #[test]
    fn unexpected_shapes_yield_no_reply() {
        for body in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
            json!({"candidates": [{"content": {"parts": [{"text": "   "}]}}]}),
        ] {
            let response: GenerateResponse = serde_json::from_value(body).unwrap();
            assert_eq!(extract_reply(&response), None);
        }
    }

    #[test]
    fn endpoint_joins_base_model_and_key() {
        let config = ChatConfig::builder()
            .api_base("https://example.test/v1beta/")
            .model("gemini-2.0-flash")
            .api_key("k123")
            .build()
            .unwrap();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent?key=k123"
        );
    }
}
