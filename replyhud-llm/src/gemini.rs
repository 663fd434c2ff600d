//! Google AI Studio (Gemini) API Integration
//!
//! Every call asks for `application/json` output with a response schema, then
//! re-validates what comes back. Nothing is retried. The API key travels in a
//! header and never appears in error text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use replyhud_core::{AiError, AiGateway, PromptRequest};

use crate::schema::{to_gemini_schema, validate_response};
use crate::{GeminiConfig, LlmError, LlmResult};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Request structure for Gemini API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    response_schema: Value,
}

/// Response structure from Gemini API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Gemini gateway with a structured-output contract
pub struct GeminiClient {
    api_key: String,
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a client; fails when no API key is configured
    pub fn new(config: GeminiConfig) -> LlmResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LlmError::Config(
                    "missing Gemini API key: set GOOGLE_API_KEY or GEMINI_API_KEY, or pass --api-key"
                        .to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generate JSON conforming to `schema`
    pub async fn generate_json(&self, prompt: &str, schema: &Value) -> LlmResult<Value> {
        let url = format!(
            "{}/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let request_body = GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                response_mime_type: "application/json",
                response_schema: to_gemini_schema(schema),
            },
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending Gemini request");
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                LlmError::Inference(format!("Gemini API request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, "Gemini API returned an error");
            return Err(LlmError::Inference(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| {
                LlmError::Inference(format!("Failed to parse Gemini response: {}", e.without_url()))
            })?;

        let text = candidate_text(gemini_response)?;
        let value: Value = serde_json::from_str(strip_code_fence(&text))?;
        validate_response(schema, &value)?;

        info!(model = %self.config.model, "Gemini response accepted");
        Ok(value)
    }
}

#[async_trait]
impl AiGateway for GeminiClient {
    async fn execute(&self, request: &PromptRequest) -> Result<Value, AiError> {
        self.generate_json(&request.prompt, &request.schema)
            .await
            .map_err(AiError::from)
    }
}

/// Text of the first candidate, with all of its parts joined
fn candidate_text(response: GeminiResponse) -> LlmResult<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .map_or_else(
                || "No response from Gemini API".to_string(),
                |reason| format!("Prompt blocked by Gemini: {reason}"),
            );
        return Err(LlmError::Inference(reason));
    };

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::Inference(format!(
            "Gemini returned no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}

/// Tolerate a model that wraps its JSON in a Markdown fence anyway
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
