//! Seams to the outside world: the generative model and the thread source.

use async_trait::async_trait;

use crate::models::ThreadContext;
use crate::prompt::PromptRequest;

/// Failure of an outbound call.
///
/// Transport errors, non-success responses and output that does not match the
/// requested shape all collapse into one reason; callers never see a partial
/// result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    #[error("network or model failure: {0}")]
    NetworkOrModelFailure(String),
}

impl AiError {
    pub fn failure(reason: impl Into<String>) -> Self {
        AiError::NetworkOrModelFailure(reason.into())
    }
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::NetworkOrModelFailure(format!("response did not match the requested shape: {err}"))
    }
}

/// Executes a prompt under a structured-output contract.
///
/// Implementations must return JSON that conforms to `request.schema` or fail.
/// They never retry.
#[async_trait]
pub trait AiGateway: Send + Sync {
    async fn execute(&self, request: &PromptRequest) -> Result<serde_json::Value, AiError>;
}

/// Supplies the post and its discussion ahead of the analysis call
#[async_trait]
pub trait ThreadSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ThreadContext, AiError>;
}
