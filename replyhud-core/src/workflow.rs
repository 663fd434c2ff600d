//! Reply workflow state machine.
//!
//! [`reduce`] is a pure function over `(state, action)`. It never performs
//! I/O; when a transition needs the outside world it returns an [`Effect`]
//! and the driver (see [`crate::session`]) reports the outcome back as a
//! completion action (`AnalysisFinished`, `GenerationFinished`,
//! `CopyExpired`).
//!
//! Phases: `Initial -> Summarized -> Generated`, with the [`Pending`] request
//! overlaying any phase. While a request is in flight every intent except
//! `Copy` is rejected with [`WorkflowError::Busy`], and only the completion
//! matching the pending request is applied.

use crate::gateway::AiError;
use crate::models::{
    AnalysisResult, CommentBatch, Comments, CopyMarker, Tone, WorkflowPhase, WorkflowSnapshot,
};
use crate::prompt::CommentRequest;
use crate::url::is_valid_post_url;
use crate::{CoreConfig, MAX_TARGET_WORDS, MIN_TARGET_WORDS};

/// Why an intent was rejected or a request failed.
///
/// The `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Enter a full Reddit post link: https://www.reddit.com/r/<community>/comments/<id>")]
    InvalidUrl,

    #[error("Could not summarize the post. Check the link and try again.")]
    AnalysisFailed(AiError),

    #[error("Could not generate new comments. Your existing comments are unchanged; try again.")]
    GenerationFailed(AiError),

    #[error("A request is already in progress")]
    Busy,

    #[error("Summarize the post before generating comments")]
    NotSummarized,

    #[error("There is no comment {index} (only {len} so far)")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// User intents and request completions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ChangeUrl(String),
    Analyze,
    AnalysisFinished(Result<AnalysisResult, AiError>),
    Generate,
    GenerationFinished(Result<CommentBatch, AiError>),
    EditComment { index: usize, text: String },
    Copy(usize),
    CopyExpired(u64),
    SelectTone(Tone),
    SetTargetWords(u16),
}

/// Which outbound request is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Analysis,
    Generation,
}

/// Work the driver must carry out after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Run the analysis call for this URL, then send `AnalysisFinished`
    RequestAnalysis { url: String },
    /// Run the generation call, then send `GenerationFinished`
    RequestComments(CommentRequest),
    /// Hand `text` to the clipboard and send `CopyExpired(ticket)` after the
    /// feedback delay
    Copied { text: String, ticket: u64 },
}

/// Result of one reducer step.
///
/// `state` is always the state to keep, including on rejection: a rejected
/// `Analyze` still records the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: WorkflowState,
    pub outcome: Result<Effect, WorkflowError>,
}

/// Complete workflow state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    phase: WorkflowPhase,
    url: String,
    analysis: Option<AnalysisResult>,
    comments: Comments,
    tone: Tone,
    target_words: u16,
    pending: Option<Pending>,
    last_error: Option<WorkflowError>,
    copied: Option<CopyMarker>,
    next_copy_ticket: u64,
    max_excluded_comments: Option<usize>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl WorkflowState {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            phase: WorkflowPhase::Initial,
            url: String::new(),
            analysis: None,
            comments: Comments::default(),
            tone: config.default_tone,
            target_words: clamp_words(config.default_target_words),
            pending: None,
            last_error: None,
            copied: None,
            next_copy_ticket: 0,
            max_excluded_comments: config.max_excluded_comments,
        }
    }

    pub const fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub const fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub const fn comments(&self) -> &Comments {
        &self.comments
    }

    pub const fn tone(&self) -> Tone {
        self.tone
    }

    pub const fn target_words(&self) -> u16 {
        self.target_words
    }

    pub const fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub const fn pending(&self) -> Option<Pending> {
        self.pending
    }

    pub const fn last_error(&self) -> Option<&WorkflowError> {
        self.last_error.as_ref()
    }

    pub const fn copied(&self) -> Option<CopyMarker> {
        self.copied
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let (post_summary, comments_summary) = self
            .analysis
            .as_ref()
            .map(|a| (a.post_summary.clone(), a.comments_summary.clone()))
            .unwrap_or_default();

        WorkflowSnapshot {
            phase: self.phase,
            url: self.url.clone(),
            post_summary,
            comments_summary,
            editable_comments: self.comments.editable().to_vec(),
            tone: self.tone,
            target_words: self.target_words,
            in_flight: self.in_flight(),
            error: self.last_error.as_ref().map(ToString::to_string),
            copied_index: self.copied.map(|marker| marker.index),
        }
    }

    /// Exclusion list for the next generation, oldest first
    fn excluded_comments(&self) -> Vec<String> {
        let pristine = self.comments.pristine();
        let skip = self
            .max_excluded_comments
            .map_or(0, |cap| pristine.len().saturating_sub(cap));
        pristine[skip..].to_vec()
    }

    /// Back to `Initial`: summaries, comments, error and copy marker cleared
    fn reset(&mut self) {
        self.phase = WorkflowPhase::Initial;
        self.analysis = None;
        self.comments.clear();
        self.last_error = None;
        self.copied = None;
    }
}

fn clamp_words(words: u16) -> u16 {
    words.clamp(MIN_TARGET_WORDS, MAX_TARGET_WORDS)
}

/// Apply one action to `state`
pub fn reduce(state: &WorkflowState, action: Action) -> Transition {
    let mut next = state.clone();
    let outcome = apply(&mut next, action);
    Transition { state: next, outcome }
}

fn apply(state: &mut WorkflowState, action: Action) -> Result<Effect, WorkflowError> {
    if state.in_flight() && rejected_while_in_flight(&action) {
        return Err(WorkflowError::Busy);
    }

    match action {
        Action::ChangeUrl(text) => {
            if state.phase != WorkflowPhase::Initial {
                state.reset();
            }
            state.url = text;
            Ok(Effect::None)
        }

        Action::Analyze => {
            if !is_valid_post_url(&state.url) {
                state.last_error = Some(WorkflowError::InvalidUrl);
                return Err(WorkflowError::InvalidUrl);
            }
            state.pending = Some(Pending::Analysis);
            state.last_error = None;
            Ok(Effect::RequestAnalysis { url: state.url.clone() })
        }

        Action::AnalysisFinished(result) => {
            if state.pending != Some(Pending::Analysis) {
                return Ok(Effect::None);
            }
            state.pending = None;

            let analysis = result.and_then(|analysis| {
                analysis
                    .normalized()
                    .ok_or_else(|| AiError::failure("analysis response had an empty summary"))
            });

            match analysis {
                Ok(analysis) => {
                    state.analysis = Some(analysis);
                    state.comments.clear();
                    state.copied = None;
                    state.phase = WorkflowPhase::Summarized;
                    Ok(Effect::None)
                }
                Err(reason) => {
                    state.analysis = None;
                    state.comments.clear();
                    state.copied = None;
                    state.phase = WorkflowPhase::Initial;
                    let error = WorkflowError::AnalysisFailed(reason);
                    state.last_error = Some(error.clone());
                    Err(error)
                }
            }
        }

        Action::Generate => {
            let Some(analysis) = state.analysis.as_ref() else {
                return Err(WorkflowError::NotSummarized);
            };
            let request = CommentRequest {
                url: state.url.clone(),
                post_summary: analysis.post_summary.clone(),
                comments_summary: analysis.comments_summary.clone(),
                excluded: state.excluded_comments(),
                tone: state.tone,
                target_words: state.target_words,
            };
            state.pending = Some(Pending::Generation);
            state.last_error = None;
            Ok(Effect::RequestComments(request))
        }

        Action::GenerationFinished(result) => {
            if state.pending != Some(Pending::Generation) {
                return Ok(Effect::None);
            }
            state.pending = None;

            let batch = result.and_then(|batch| {
                let comments = batch.normalized();
                if comments.is_empty() {
                    Err(AiError::failure("generation response had no usable comments"))
                } else {
                    Ok(comments)
                }
            });

            match batch {
                Ok(comments) => {
                    state.comments.extend(comments);
                    state.phase = WorkflowPhase::Generated;
                    Ok(Effect::None)
                }
                Err(reason) => {
                    let error = WorkflowError::GenerationFailed(reason);
                    state.last_error = Some(error.clone());
                    Err(error)
                }
            }
        }

        Action::EditComment { index, text } => {
            if state.comments.edit(index, text) {
                Ok(Effect::None)
            } else {
                Err(WorkflowError::IndexOutOfBounds {
                    index,
                    len: state.comments.len(),
                })
            }
        }

        Action::Copy(index) => {
            let Some(text) = state
                .comments
                .editable()
                .get(index)
                .filter(|text| !text.is_empty())
                .cloned()
            else {
                return Ok(Effect::None);
            };
            let ticket = state.next_copy_ticket;
            state.next_copy_ticket += 1;
            state.copied = Some(CopyMarker { index, ticket });
            Ok(Effect::Copied { text, ticket })
        }

        Action::CopyExpired(ticket) => {
            if state.copied.is_some_and(|marker| marker.ticket == ticket) {
                state.copied = None;
            }
            Ok(Effect::None)
        }

        Action::SelectTone(tone) => {
            state.tone = tone;
            Ok(Effect::None)
        }

        Action::SetTargetWords(words) => {
            state.target_words = clamp_words(words);
            Ok(Effect::None)
        }
    }
}

const fn rejected_while_in_flight(action: &Action) -> bool {
    !matches!(
        action,
        Action::AnalysisFinished(_)
            | Action::GenerationFinished(_)
            | Action::Copy(_)
            | Action::CopyExpired(_)
    )
}
