//! Post URL validation

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref POST_URL: Regex =
        Regex::new(r"^https?://(www\.)?reddit\.com/r/[A-Za-z0-9_]+/comments/[A-Za-z0-9]+")
            .expect("post URL pattern is valid");
}

/// True when `text` is an absolute link to a Reddit post:
/// `http(s)://[www.]reddit.com/r/<community>/comments/<id>...`
pub fn is_valid_post_url(text: &str) -> bool {
    POST_URL.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_post_links() {
        assert!(is_valid_post_url("https://www.reddit.com/r/test/comments/abc123/title"));
        assert!(is_valid_post_url("http://reddit.com/r/rust_lang/comments/1a2b3c"));
        assert!(is_valid_post_url("https://reddit.com/r/AskReddit/comments/xyz/?utm_source=share"));
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(!is_valid_post_url("https://reddit.com/user/foo"));
        assert!(!is_valid_post_url("reddit.com/r/test/comments/abc123"));
        assert!(!is_valid_post_url("https://www.reddit.com/r//comments/abc123"));
        assert!(!is_valid_post_url("https://www.reddit.com/r/test/comments/"));
        assert!(!is_valid_post_url("https://www.reddit.com/comments/abc123"));
        assert!(!is_valid_post_url("ftp://www.reddit.com/r/test/comments/abc123"));
        assert!(!is_valid_post_url("https://old.reddit.com/r/test/comments/abc123"));
        assert!(!is_valid_post_url(" https://www.reddit.com/r/test/comments/abc123"));
        assert!(!is_valid_post_url(""));
    }

    proptest! {
        #[test]
        fn well_formed_links_are_accepted(
            secure in any::<bool>(),
            www in any::<bool>(),
            community in "[A-Za-z0-9_]{1,21}",
            id in "[a-z0-9]{1,10}",
            tail in "(/[a-z0-9_]{0,30})?",
        ) {
            let url = format!(
                "{}://{}reddit.com/r/{}/comments/{}{}",
                if secure { "https" } else { "http" },
                if www { "www." } else { "" },
                community,
                id,
                tail,
            );
            prop_assert!(is_valid_post_url(&url));
        }

        #[test]
        fn links_without_post_id_are_rejected(community in "[A-Za-z0-9_]{1,21}") {
            let url = format!("https://www.reddit.com/r/{community}/comments/");
            prop_assert!(!is_valid_post_url(&url));
        }

        #[test]
        fn text_without_scheme_is_rejected(path in "[a-z0-9/._]{0,40}") {
            let url = format!("www.reddit.com/r/{path}");
            prop_assert!(!is_valid_post_url(&url));
        }
    }
}
