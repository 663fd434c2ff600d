//! Workflow data model

use serde::{Deserialize, Serialize};

/// Progress marker of the reply workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowPhase {
    /// Nothing analysed yet, or the last analysis failed
    #[default]
    Initial,
    /// Post and discussion summaries are available
    Summarized,
    /// At least one batch of comments has been generated
    Generated,
}

impl std::fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowPhase::Initial => write!(f, "initial"),
            WorkflowPhase::Summarized => write!(f, "summarized"),
            WorkflowPhase::Generated => write!(f, "generated"),
        }
    }
}

/// Tone requested for generated comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Tone {
    #[default]
    Neutral,
    Informative,
    Humorous,
    Supportive,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Neutral, Tone::Informative, Tone::Humorous, Tone::Supportive];

    /// What the tone means to the model
    pub const fn vibe(self) -> &'static str {
        match self {
            Tone::Neutral => "balanced, straightforward, conversational",
            Tone::Informative => "explanatory with quick facts or steps, still conversational",
            Tone::Humorous => "light, dry humor; no memes; no mocking the original poster",
            Tone::Supportive => "empathetic, encouraging, practical next steps",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tone::Neutral => write!(f, "Neutral"),
            Tone::Informative => write!(f, "Informative"),
            Tone::Humorous => write!(f, "Humorous"),
            Tone::Supportive => write!(f, "Supportive"),
        }
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neutral" => Ok(Tone::Neutral),
            "informative" => Ok(Tone::Informative),
            "humorous" => Ok(Tone::Humorous),
            "supportive" => Ok(Tone::Supportive),
            _ => Err(format!(
                "Invalid tone: '{s}'. Valid options: neutral, informative, humorous, supportive"
            )),
        }
    }
}

/// Structured output of the analysis call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub post_summary: String,
    pub comments_summary: String,
}

impl AnalysisResult {
    /// Trim both summaries; `None` unless both carry text.
    pub fn normalized(self) -> Option<Self> {
        let post_summary = self.post_summary.trim().to_string();
        let comments_summary = self.comments_summary.trim().to_string();
        if post_summary.is_empty() || comments_summary.is_empty() {
            return None;
        }
        Some(Self { post_summary, comments_summary })
    }
}

/// Structured output of the comment-generation call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBatch {
    pub new_comments: Vec<String>,
}

impl CommentBatch {
    /// Trimmed comments with blank entries dropped
    pub fn normalized(self) -> Vec<String> {
        self.new_comments
            .into_iter()
            .map(|comment| comment.trim().to_string())
            .filter(|comment| !comment.is_empty())
            .collect()
    }
}

/// Generated comments in their two representations.
///
/// `pristine` holds the text exactly as generated and only ever grows; it is
/// replayed to the model as the exclusion list. `editable` is what the user
/// sees and changes. Both always have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comments {
    pristine: Vec<String>,
    editable: Vec<String>,
}

impl Comments {
    pub fn len(&self) -> usize {
        self.pristine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pristine.is_empty()
    }

    pub fn pristine(&self) -> &[String] {
        &self.pristine
    }

    pub fn editable(&self) -> &[String] {
        &self.editable
    }

    /// Append a batch to both sequences
    pub fn extend(&mut self, batch: Vec<String>) {
        self.editable.extend(batch.iter().cloned());
        self.pristine.extend(batch);
    }

    /// Overwrite the editable text at `index`; returns false when out of bounds
    pub fn edit(&mut self, index: usize, text: String) -> bool {
        match self.editable.get_mut(index) {
            Some(slot) => {
                *slot = text;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.pristine.clear();
        self.editable.clear();
    }
}

/// Marks which comment was copied last.
///
/// `ticket` increases with every copy so a stale expiry timer cannot clear a
/// newer marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CopyMarker {
    pub index: usize,
    pub ticket: u64,
}

/// Thread material fetched ahead of the analysis call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreadContext {
    pub title: String,
    pub body: String,
    pub subreddit: String,
    pub author: String,
    pub permalink: String,
    pub comments: Vec<String>,
}

/// Read-only view handed to the presentation layer after every transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowSnapshot {
    pub phase: WorkflowPhase,
    pub url: String,
    pub post_summary: String,
    pub comments_summary: String,
    pub editable_comments: Vec<String>,
    pub tone: Tone,
    pub target_words: u16,
    pub in_flight: bool,
    pub error: Option<String>,
    pub copied_index: Option<usize>,
}
