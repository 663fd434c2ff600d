//! ReplyHUD LLM - Model and Thread Integration
//!
//! Concrete implementations of the two outbound seams defined in
//! `replyhud-core`:
//! - [`GeminiClient`]: an [`AiGateway`](replyhud_core::AiGateway) backed by the
//!   Gemini `generateContent` endpoint with a JSON response contract
//! - [`RedditThreadFetcher`]: a [`ThreadSource`](replyhud_core::ThreadSource)
//!   reading a post and its top-level comments from the public listing JSON

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod gemini;
pub mod schema;
pub mod thread;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use gemini::GeminiClient;
pub use schema::{to_gemini_schema, validate_response};
pub use thread::RedditThreadFetcher;

use replyhud_core::AiError;

/// Result type for LLM operations
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Error types for LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema validation error
    #[error("Schema validation error: {0}")]
    Schema(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be loaded
    #[error("Utility error: {0}")]
    Util(#[from] replyhud_utils::UtilError),

    /// Model inference error
    #[error("Model inference error: {0}")]
    Inference(String),
}

impl From<LlmError> for AiError {
    fn from(err: LlmError) -> Self {
        AiError::failure(err.to_string())
    }
}

pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const OLD_REDDIT_BASE_URL: &str = "https://old.reddit.com";

/// Environment variables consulted for the Gemini API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Gemini client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: GEMINI_API_BASE_URL.to_string(),
            temperature: 0.9,
            max_output_tokens: 2048,
            timeout_secs: 60,
        }
    }
}

impl GeminiConfig {
    /// Fill `api_key` from the environment when it is not already set
    #[must_use]
    pub fn with_env_api_key(mut self) -> Self {
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            self.api_key = API_KEY_ENV_VARS
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .find(|value| !value.trim().is_empty());
        }
        self
    }
}

/// Thread fetcher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Fetch the thread before analysis; when off the summary prompt only
    /// carries the URL
    pub enabled: bool,
    pub base_url: String,
    /// Top-level listing entries considered for the comment sample
    pub max_comments: usize,
    pub timeout_secs: u64,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: OLD_REDDIT_BASE_URL.to_string(),
            max_comments: 25,
            timeout_secs: 20,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub gemini: GeminiConfig,
    pub thread: ThreadConfig,
}

impl LlmConfig {
    /// Load from a TOML, JSON or YAML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> LlmResult<Self> {
        Ok(replyhud_utils::load_config(path)?)
    }

    pub fn validate(&self) -> LlmResult<()> {
        if self.gemini.model.trim().is_empty() {
            return Err(LlmError::Config("gemini.model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err(LlmError::Config(format!(
                "gemini.temperature must be between 0 and 2, got {}",
                self.gemini.temperature
            )));
        }
        if self.gemini.timeout_secs == 0 || self.thread.timeout_secs == 0 {
            return Err(LlmError::Config("timeouts must be at least one second".to_string()));
        }
        Ok(())
    }
}
