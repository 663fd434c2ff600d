//! Reddit thread fetching.
//!
//! Reads `<permalink>.json` from the listing host. The first listing holds the
//! post, the second the comment tree; only top-level comments are sampled.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use replyhud_core::{AiError, ThreadContext, ThreadSource};

use crate::{LlmError, LlmResult, ThreadConfig};

/// The listing endpoint refuses generic client user agents
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0 Safari/537.36";

const REDDIT_HOST: &str = "reddit.com";
const PERMALINK_BASE: &str = "https://www.reddit.com";
const DELETED: &str = "[deleted]";

pub struct RedditThreadFetcher {
    config: ThreadConfig,
    client: Client,
}

impl RedditThreadFetcher {
    pub fn new(config: ThreadConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self { config, client })
    }

    /// JSON listing URL for a post link: query dropped, trailing slash
    /// trimmed, host replaced by the configured listing host
    pub fn listing_url(&self, url: &str) -> LlmResult<String> {
        let base = url.split(['?', '#']).next().unwrap_or(url).trim_end_matches('/');
        let path = base
            .find(REDDIT_HOST)
            .map(|start| &base[start + REDDIT_HOST.len()..])
            .filter(|path| path.starts_with('/'))
            .ok_or_else(|| LlmError::Config(format!("not a Reddit link: {url}")))?;

        Ok(format!("{}{}.json", self.config.base_url.trim_end_matches('/'), path))
    }

    pub async fn fetch_thread(&self, url: &str) -> LlmResult<ThreadContext> {
        let listing_url = self.listing_url(url)?;
        debug!(url = %listing_url, "fetching thread");

        let response = self.client.get(&listing_url).send().await?.error_for_status()?;
        let listing: Value = response.json().await?;
        parse_listing(&listing, self.config.max_comments)
    }
}

#[async_trait]
impl ThreadSource for RedditThreadFetcher {
    async fn fetch(&self, url: &str) -> Result<ThreadContext, AiError> {
        self.fetch_thread(url).await.map_err(AiError::from)
    }
}

/// Build a [`ThreadContext`] from the two-listing response.
///
/// Only the first `max_comments` top-level entries are looked at; entries that
/// are not comments (`kind != "t1"`), empty or deleted are skipped.
pub fn parse_listing(listing: &Value, max_comments: usize) -> LlmResult<ThreadContext> {
    let post = listing
        .pointer("/0/data/children/0/data")
        .ok_or_else(|| LlmError::Schema("thread listing has no post".to_string()))?;

    let field = |name: &str| post.get(name).and_then(Value::as_str).unwrap_or_default().to_string();

    let comments = listing
        .pointer("/1/data/children")
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .take(max_comments)
                .filter(|child| child.get("kind").and_then(Value::as_str) == Some("t1"))
                .filter_map(|child| child.pointer("/data/body").and_then(Value::as_str))
                .filter(|body| !body.is_empty() && *body != DELETED)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(ThreadContext {
        title: field("title"),
        body: field("selftext"),
        subreddit: field("subreddit_name_prefixed"),
        author: post
            .get("author")
            .and_then(Value::as_str)
            .unwrap_or(DELETED)
            .to_string(),
        permalink: format!("{PERMALINK_BASE}{}", field("permalink")),
        comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetcher() -> RedditThreadFetcher {
        RedditThreadFetcher::new(ThreadConfig::default()).unwrap()
    }

    fn listing(children: Vec<Value>) -> Value {
        json!([
            { "data": { "children": [{ "kind": "t3", "data": {
                "title": "Title",
                "selftext": "Body",
                "permalink": "/r/test/comments/abc123/title/",
                "subreddit_name_prefixed": "r/test",
                "author": "op"
            }}]}},
            { "data": { "children": children } }
        ])
    }

    fn comment(body: &str) -> Value {
        json!({ "kind": "t1", "data": { "body": body } })
    }

    #[test]
    fn test_listing_url_normalization() {
        let fetcher = fetcher();
        assert_eq!(
            fetcher.listing_url("https://www.reddit.com/r/test/comments/abc123/title/?utm_source=share").unwrap(),
            "https://old.reddit.com/r/test/comments/abc123/title.json"
        );
        assert_eq!(
            fetcher.listing_url("https://reddit.com/r/test/comments/abc123").unwrap(),
            "https://old.reddit.com/r/test/comments/abc123.json"
        );
    }

    #[test]
    fn test_listing_url_rejects_other_hosts() {
        assert!(fetcher().listing_url("https://example.com/r/test").is_err());
    }

    #[test]
    fn test_parse_listing_reads_post_fields() {
        let thread = parse_listing(&listing(vec![comment("first")]), 25).unwrap();
        assert_eq!(thread.title, "Title");
        assert_eq!(thread.body, "Body");
        assert_eq!(thread.subreddit, "r/test");
        assert_eq!(thread.author, "op");
        assert_eq!(thread.permalink, "https://www.reddit.com/r/test/comments/abc123/title/");
        assert_eq!(thread.comments, vec!["first"]);
    }

    #[test]
    fn test_parse_listing_skips_deleted_and_non_comments() {
        let children = vec![
            comment("kept"),
            comment(DELETED),
            comment(""),
            json!({ "kind": "more", "data": { "children": ["x"] } }),
            comment("also kept"),
        ];
        let thread = parse_listing(&listing(children), 25).unwrap();
        assert_eq!(thread.comments, vec!["kept", "also kept"]);
    }

    #[test]
    fn test_parse_listing_samples_first_entries_only() {
        let children = (0..40).map(|i| comment(&format!("c{i}"))).collect();
        let thread = parse_listing(&listing(children), 25).unwrap();
        assert_eq!(thread.comments.len(), 25);
        assert_eq!(thread.comments[24], "c24");
    }

    #[test]
    fn test_parse_listing_without_post_fails() {
        assert!(matches!(parse_listing(&json!([]), 25), Err(LlmError::Schema(_))));
    }
}
