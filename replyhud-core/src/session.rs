//! Async driver around the workflow reducer.
//!
//! The session keeps the one [`WorkflowState`] inside a `tokio::sync::watch`
//! channel. Every intent is applied with `send_if_modified`, so the in-flight
//! check and the in-flight flag update happen in the same locked step: two
//! concurrent `analyze()`/`generate_comments()` calls cannot both start a
//! request. The lock is never held across an await.
//!
//! No timeout is applied here; a gateway call that never resolves leaves the
//! session in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::gateway::{AiError, AiGateway, ThreadSource};
use crate::models::{AnalysisResult, CommentBatch, Tone, WorkflowSnapshot};
use crate::prompt::{self, CommentRequest};
use crate::workflow::{reduce, Action, Effect, WorkflowError, WorkflowState};
use crate::CoreConfig;

/// One user's reply workflow
pub struct WorkflowSession<G> {
    inner: Arc<SessionInner<G>>,
}

impl<G> Clone for WorkflowSession<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionInner<G> {
    gateway: G,
    thread_source: Option<Arc<dyn ThreadSource>>,
    state: watch::Sender<WorkflowState>,
    copy_feedback: Duration,
}

impl<G> SessionInner<G> {
    fn dispatch(&self, action: Action) -> Result<Effect, WorkflowError> {
        let mut outcome = Ok(Effect::None);
        self.state.send_if_modified(|state| {
            let transition = reduce(state, action);
            outcome = transition.outcome;
            if *state == transition.state {
                false
            } else {
                *state = transition.state;
                true
            }
        });
        outcome
    }
}

impl<G> WorkflowSession<G>
where
    G: AiGateway + 'static,
{
    pub fn new(gateway: G, config: &CoreConfig) -> Self {
        Self::build(gateway, None, config)
    }

    /// Session that fetches the thread before each analysis and grounds the
    /// summary prompt in it
    pub fn with_thread_source(
        gateway: G,
        thread_source: Arc<dyn ThreadSource>,
        config: &CoreConfig,
    ) -> Self {
        Self::build(gateway, Some(thread_source), config)
    }

    fn build(gateway: G, thread_source: Option<Arc<dyn ThreadSource>>, config: &CoreConfig) -> Self {
        let (state, _) = watch::channel(WorkflowState::new(config));
        Self {
            inner: Arc::new(SessionInner {
                gateway,
                thread_source,
                state,
                copy_feedback: config.copy_feedback(),
            }),
        }
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.inner.state.borrow().snapshot()
    }

    pub fn state(&self) -> WorkflowState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.inner.state.subscribe()
    }

    pub fn change_url(&self, text: impl Into<String>) -> Result<(), WorkflowError> {
        self.dispatch(Action::ChangeUrl(text.into())).map(drop)
    }

    pub fn select_tone(&self, tone: Tone) -> Result<(), WorkflowError> {
        self.dispatch(Action::SelectTone(tone)).map(drop)
    }

    pub fn set_target_words(&self, words: u16) -> Result<(), WorkflowError> {
        self.dispatch(Action::SetTargetWords(words)).map(drop)
    }

    pub fn edit_comment(&self, index: usize, text: impl Into<String>) -> Result<(), WorkflowError> {
        self.dispatch(Action::EditComment {
            index,
            text: text.into(),
        })
        .map(drop)
    }

    /// Mark comment `index` as copied and return its text for the clipboard.
    ///
    /// `Ok(None)` when there is nothing to copy. The marker clears itself
    /// after the feedback delay unless a later copy replaced it. Must be
    /// called inside a tokio runtime.
    pub fn copy(&self, index: usize) -> Result<Option<String>, WorkflowError> {
        match self.dispatch(Action::Copy(index))? {
            Effect::Copied { text, ticket } => {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    tokio::time::sleep(inner.copy_feedback).await;
                    let _ = inner.dispatch(Action::CopyExpired(ticket));
                });
                Ok(Some(text))
            }
            _ => Ok(None),
        }
    }

    /// Summarize the post behind the current URL
    pub async fn analyze(&self) -> Result<(), WorkflowError> {
        let effect = self.dispatch(Action::Analyze)?;
        let Effect::RequestAnalysis { url } = effect else {
            return Ok(());
        };

        info!(url = %url, "analyzing post");
        let result = self.run_analysis(&url).await;
        if let Err(e) = &result {
            warn!(url = %url, error = %e, "analysis call failed");
        }
        self.dispatch(Action::AnalysisFinished(result)).map(drop)
    }

    /// Generate another round of comments, excluding everything generated so far
    pub async fn generate_comments(&self) -> Result<(), WorkflowError> {
        let effect = self.dispatch(Action::Generate)?;
        let Effect::RequestComments(request) = effect else {
            return Ok(());
        };

        info!(
            tone = %request.tone,
            excluded = request.excluded.len(),
            "generating comments"
        );
        let result = self.run_generation(&request).await;
        if let Err(e) = &result {
            warn!(error = %e, "generation call failed");
        }
        self.dispatch(Action::GenerationFinished(result)).map(drop)
    }

    async fn run_analysis(&self, url: &str) -> Result<AnalysisResult, AiError> {
        let request = match &self.inner.thread_source {
            Some(source) => match source.fetch(url).await {
                Ok(thread) => {
                    debug!(comments = thread.comments.len(), "thread fetched");
                    prompt::build_analysis_prompt_with_thread(url, &thread)
                }
                Err(e) => {
                    warn!(error = %e, "thread fetch failed; analyzing from the URL alone");
                    prompt::build_analysis_prompt(url)
                }
            },
            None => prompt::build_analysis_prompt(url),
        };

        let value = self.inner.gateway.execute(&request).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn run_generation(&self, request: &CommentRequest) -> Result<CommentBatch, AiError> {
        let request = prompt::build_comment_prompt(request);
        let value = self.inner.gateway.execute(&request).await?;
        Ok(serde_json::from_value(value)?)
    }

    fn dispatch(&self, action: Action) -> Result<Effect, WorkflowError> {
        debug!(?action, "dispatch");
        self.inner.dispatch(action)
    }
}
