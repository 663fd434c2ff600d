//! Thread fetching against a mock listing host.

use serde_json::json;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use replyhud_core::ThreadSource;
use replyhud_llm::{RedditThreadFetcher, ThreadConfig};

fn fetcher(server: &MockServer) -> RedditThreadFetcher {
    RedditThreadFetcher::new(ThreadConfig {
        base_url: server.uri(),
        ..ThreadConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_reads_post_and_comments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/rust/comments/abc123/which_runtime.json"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "kind": "Listing", "data": { "children": [{ "kind": "t3", "data": {
                "title": "Which runtime?",
                "selftext": "tokio or smol",
                "permalink": "/r/rust/comments/abc123/which_runtime/",
                "subreddit_name_prefixed": "r/rust",
                "author": "op"
            }}]}},
            { "kind": "Listing", "data": { "children": [
                { "kind": "t1", "data": { "body": "tokio" } },
                { "kind": "t1", "data": { "body": "[deleted]" } },
                { "kind": "more", "data": {} }
            ]}}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let thread = fetcher(&server)
        .fetch("https://www.reddit.com/r/rust/comments/abc123/which_runtime/?share=1")
        .await
        .unwrap();

    assert_eq!(thread.title, "Which runtime?");
    assert_eq!(thread.subreddit, "r/rust");
    assert_eq!(thread.comments, vec!["tokio"]);
}

#[tokio::test]
async fn test_blocked_listing_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = fetcher(&server)
        .fetch("https://www.reddit.com/r/rust/comments/abc123")
        .await;

    assert!(result.is_err());
}
