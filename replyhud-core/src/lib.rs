//! ReplyHUD Core - Reply Workflow Engine
//!
//! This crate owns the two-step reply workflow:
//! - URL validation gating the analysis step
//! - Prompt construction for the summary and comment-generation requests
//! - A pure reducer over the workflow state (`reduce`)
//! - An async session driver that runs the reducer's effects through an
//!   [`AiGateway`] with a single in-flight request at a time
//!
//! Rendering, clipboard access and the network transport live elsewhere; the
//! presentation layer reads [`WorkflowSnapshot`]s and sends intents back.

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
)]
#![allow(
    clippy::module_name_repetitions,
)]

pub mod gateway;
pub mod models;
pub mod prompt;
pub mod session;
pub mod url;
pub mod workflow;

pub use gateway::{AiError, AiGateway, ThreadSource};
pub use models::{
    AnalysisResult, CommentBatch, Comments, CopyMarker, ThreadContext, Tone, WorkflowPhase,
    WorkflowSnapshot,
};
pub use prompt::{CommentRequest, PromptRequest};
pub use session::WorkflowSession;
pub use url::is_valid_post_url;
pub use workflow::{reduce, Action, Effect, Pending, Transition, WorkflowError, WorkflowState};

/// Result type used throughout ReplyHUD core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ReplyHUD core operations outside the workflow itself.
///
/// Workflow rejections and request failures are [`WorkflowError`]s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Shortest and longest target length, in words, a comment may ask for
pub const MIN_TARGET_WORDS: u16 = 50;
pub const MAX_TARGET_WORDS: u16 = 220;

/// Number of comments requested per generation round
pub const COMMENTS_PER_ROUND: usize = 3;

/// Workflow settings
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// How long the "copied" marker stays visible, in milliseconds
    pub copy_feedback_ms: u64,
    /// Tone selected when a session starts
    pub default_tone: Tone,
    /// Target words per comment when a session starts
    pub default_target_words: u16,
    /// Replay only the most recent N pristine comments as the exclusion list.
    /// `None` replays all of them.
    pub max_excluded_comments: Option<usize>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            copy_feedback_ms: 2000,
            default_tone: Tone::Neutral,
            default_target_words: 100,
            max_excluded_comments: None,
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.copy_feedback_ms == 0 {
            return Err(Error::Config("copy_feedback_ms must be positive".to_string()));
        }
        if !(MIN_TARGET_WORDS..=MAX_TARGET_WORDS).contains(&self.default_target_words) {
            return Err(Error::Config(format!(
                "default_target_words must be between {MIN_TARGET_WORDS} and {MAX_TARGET_WORDS}"
            )));
        }
        if self.max_excluded_comments == Some(0) {
            return Err(Error::Config(
                "max_excluded_comments must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub const fn copy_feedback(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.copy_feedback_ms)
    }
}
