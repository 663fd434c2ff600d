//! Plain-text rendering of workflow snapshots.

use std::fmt::Write as _;

use replyhud_core::{WorkflowPhase, WorkflowSnapshot};

pub fn snapshot(view: &WorkflowSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Phase: {} | Tone: {} | Target: ~{} words{}",
        view.phase,
        view.tone,
        view.target_words,
        if view.in_flight { " | working..." } else { "" }
    );
    if view.url.is_empty() {
        out.push_str("URL: (not set)\n");
    } else {
        let _ = writeln!(out, "URL: {}", view.url);
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "❌ {error}");
    }

    if view.phase != WorkflowPhase::Initial {
        let _ = write!(
            out,
            "\nPost summary:\n{}\n\nDiscussion summary:\n{}\n",
            indent(&view.post_summary),
            indent(&view.comments_summary)
        );
    }

    if !view.editable_comments.is_empty() {
        out.push('\n');
        out.push_str(&comments(view));
    }
    out
}

/// Numbered replies, 1-based, with the copied one flagged
pub fn comments(view: &WorkflowSnapshot) -> String {
    let mut out = String::new();
    for (index, comment) in view.editable_comments.iter().enumerate() {
        let copied = if view.copied_index == Some(index) { "  ✓ copied" } else { "" };
        let _ = writeln!(out, "[{}]{copied}\n{}\n", index + 1, indent(comment));
    }
    out
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use replyhud_core::{Tone, WorkflowState};

    fn generated_view() -> WorkflowSnapshot {
        WorkflowSnapshot {
            phase: WorkflowPhase::Generated,
            url: "https://www.reddit.com/r/test/comments/abc123".to_string(),
            post_summary: "P".to_string(),
            comments_summary: "C".to_string(),
            editable_comments: vec!["a".to_string(), "b\nsecond line".to_string()],
            tone: Tone::Humorous,
            target_words: 100,
            in_flight: false,
            error: None,
            copied_index: Some(1),
        }
    }

    #[test]
    fn test_initial_view() {
        let text = snapshot(&WorkflowState::default().snapshot());
        assert!(text.contains("Phase: initial | Tone: Neutral | Target: ~100 words"));
        assert!(text.contains("URL: (not set)"));
        assert!(!text.contains("Post summary"));
    }

    #[test]
    fn test_generated_view_numbers_replies_from_one() {
        let text = snapshot(&generated_view());
        assert!(text.contains("Post summary:\n    P"));
        assert!(text.contains("[1]\n    a"));
        assert!(text.contains("[2]  ✓ copied\n    b\n    second line"));
    }

    #[test]
    fn test_error_is_shown() {
        let view = WorkflowSnapshot {
            error: Some("Could not generate new comments.".to_string()),
            in_flight: true,
            ..generated_view()
        };
        let text = snapshot(&view);
        assert!(text.contains("❌ Could not generate new comments."));
        assert!(text.contains("working..."));
    }
}
