//! Prompt construction for the two model calls.
//!
//! Both builders are pure: they return the prompt text together with the JSON
//! Schema the response must satisfy.

use serde_json::{json, Value};
use std::fmt::Write as _;

use crate::models::{ThreadContext, Tone};
use crate::COMMENTS_PER_ROUND;

/// Prompt text plus the response-shape contract
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub prompt: String,
    pub schema: Value,
}

/// Everything the comment prompt is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRequest {
    pub url: String,
    pub post_summary: String,
    pub comments_summary: String,
    /// Earlier comments as generated, oldest first
    pub excluded: Vec<String>,
    pub tone: Tone,
    pub target_words: u16,
}

const STYLE_RULES: &[&str] = &[
    "Write in a conversational register, like a regular member of the community.",
    "Keep paragraphs short: one to three sentences each.",
    "When a point has several parts, prefer a short bulleted list over a long paragraph.",
    "Add something non-obvious that the existing discussion has not already covered.",
    "Do not end with a call to action or an invitation to reply.",
    "Never say or imply that you are an AI, a bot or an automated assistant.",
    "No marketing or salesy tone; avoid cliches and filler.",
    "No emojis, no hashtags, no links, no disclaimers.",
];

pub fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "postSummary": { "type": "string" },
            "commentsSummary": { "type": "string" }
        },
        "required": ["postSummary", "commentsSummary"]
    })
}

pub fn comments_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "newComments": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": COMMENTS_PER_ROUND,
                "maxItems": COMMENTS_PER_ROUND
            }
        },
        "required": ["newComments"]
    })
}

/// Summary request for a post, with no thread material attached
pub fn build_analysis_prompt(url: &str) -> PromptRequest {
    build_analysis(url, None)
}

/// Summary request grounded in the fetched thread
pub fn build_analysis_prompt_with_thread(url: &str, thread: &ThreadContext) -> PromptRequest {
    build_analysis(url, Some(thread))
}

fn build_analysis(url: &str, thread: Option<&ThreadContext>) -> PromptRequest {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "You are preparing to join the discussion on this Reddit post: {url}");
    prompt.push('\n');
    prompt.push_str(
        "1. postSummary: summarize the post for someone who has not seen it. \
         State the core problem or question the author raises. Be neutral, concrete \
         and brief (3-5 sentences).\n",
    );
    prompt.push_str(
        "2. commentsSummary: summarize the main viewpoints and recurring advice in the \
         existing comments as 4-6 short bullet points, grouping similar opinions. \
         This summary is used later so new replies do not repeat what has already \
         been said. If there are no comments, say so.\n",
    );

    if let Some(thread) = thread {
        prompt.push_str("\nTHREAD\n");
        if !thread.subreddit.is_empty() {
            let _ = writeln!(prompt, "Community: {}", thread.subreddit);
        }
        let _ = writeln!(prompt, "Title: {}", thread.title);
        if !thread.body.is_empty() {
            let _ = writeln!(prompt, "Body:\n{}", thread.body);
        }
        prompt.push_str("\nCOMMENTS\n");
        if thread.comments.is_empty() {
            prompt.push_str("No comments.\n");
        } else {
            for comment in &thread.comments {
                let _ = writeln!(prompt, "- {}", comment.replace('\n', " "));
            }
        }
    }

    prompt.push_str("\nRespond only with JSON matching the provided schema. No prose outside the JSON.\n");

    PromptRequest {
        prompt,
        schema: analysis_schema(),
    }
}

/// Comment-generation request.
///
/// Every earlier generated comment is listed verbatim so the model does not
/// produce near-duplicates; exactly three new comments are requested no
/// matter how many already exist.
pub fn build_comment_prompt(request: &CommentRequest) -> PromptRequest {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Write {COMMENTS_PER_ROUND} distinct Reddit-style replies for the thread: {}",
        request.url
    );
    let _ = writeln!(
        prompt,
        "Tone (hard requirement): {} ({}). Every reply must follow this tone.",
        request.tone,
        request.tone.vibe()
    );
    let _ = writeln!(prompt, "Target length: about {} words per reply.", request.target_words);

    prompt.push_str("\nRules:\n");
    for rule in STYLE_RULES {
        let _ = writeln!(prompt, "- {rule}");
    }

    let _ = write!(
        prompt,
        "\nPOST SUMMARY:\n{}\n\nEXISTING DISCUSSION (do not repeat these points):\n{}\n",
        request.post_summary, request.comments_summary
    );

    if !request.excluded.is_empty() {
        prompt.push_str(
            "\nALREADY WRITTEN (do not repeat, paraphrase or closely imitate any of these):\n",
        );
        for (index, comment) in request.excluded.iter().enumerate() {
            let _ = writeln!(prompt, "{}. {}", index + 1, comment);
        }
    }

    let _ = write!(
        prompt,
        "\nReturn exactly {COMMENTS_PER_ROUND} new replies in newComments. \
         Respond only with JSON matching the provided schema.\n"
    );

    PromptRequest {
        prompt,
        schema: comments_schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment_request(excluded: Vec<String>) -> CommentRequest {
        CommentRequest {
            url: "https://www.reddit.com/r/test/comments/abc123/title".to_string(),
            post_summary: "P".to_string(),
            comments_summary: "C".to_string(),
            excluded,
            tone: Tone::Humorous,
            target_words: 120,
        }
    }

    #[test]
    fn test_analysis_prompt_mentions_url_and_both_fields() {
        let request = build_analysis_prompt("https://www.reddit.com/r/test/comments/abc123");
        assert!(request.prompt.contains("https://www.reddit.com/r/test/comments/abc123"));
        assert!(request.prompt.contains("postSummary"));
        assert!(request.prompt.contains("commentsSummary"));
        assert!(!request.prompt.contains("THREAD"));
        assert_eq!(request.schema["required"], json!(["postSummary", "commentsSummary"]));
    }

    #[test]
    fn test_analysis_prompt_embeds_thread() {
        let thread = ThreadContext {
            title: "Borrow checker woes".to_string(),
            body: "Why does this not compile?".to_string(),
            subreddit: "r/rust".to_string(),
            author: "ferris".to_string(),
            permalink: "https://www.reddit.com/r/rust/comments/abc".to_string(),
            comments: vec!["Use a clone.\nOr an Rc.".to_string()],
        };
        let request = build_analysis_prompt_with_thread("https://www.reddit.com/r/rust/comments/abc", &thread);
        assert!(request.prompt.contains("Title: Borrow checker woes"));
        assert!(request.prompt.contains("Community: r/rust"));
        assert!(request.prompt.contains("- Use a clone. Or an Rc."));
    }

    #[test]
    fn test_comment_prompt_carries_tone_and_rules() {
        let request = build_comment_prompt(&comment_request(Vec::new()));
        assert!(request.prompt.contains("Tone (hard requirement): Humorous"));
        assert!(request.prompt.contains(Tone::Humorous.vibe()));
        assert!(request.prompt.contains("about 120 words"));
        for rule in STYLE_RULES {
            assert!(request.prompt.contains(rule));
        }
        assert!(!request.prompt.contains("ALREADY WRITTEN"));
    }

    #[test]
    fn test_comment_prompt_lists_every_prior_comment_verbatim() {
        let prior: Vec<String> = (0..7).map(|i| format!("earlier reply number {i}")).collect();
        let request = build_comment_prompt(&comment_request(prior.clone()));

        assert!(request.prompt.contains("ALREADY WRITTEN"));
        for (index, comment) in prior.iter().enumerate() {
            assert!(request.prompt.contains(&format!("{}. {}", index + 1, comment)));
        }
    }

    #[test]
    fn test_comment_schema_always_asks_for_three() {
        let prior = vec!["a".to_string(); 12];
        let request = build_comment_prompt(&comment_request(prior));
        let items = &request.schema["properties"]["newComments"];
        assert_eq!(items["minItems"], json!(3));
        assert_eq!(items["maxItems"], json!(3));
        assert!(request.prompt.contains("Return exactly 3 new replies"));
    }
}
