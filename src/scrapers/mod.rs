//! Page fetching and extraction for the upstream cricket site.
//!
//! Fetching sits behind [`PageSource`] so parsers and ingest flows can run
//! against canned pages. Parsers are pure functions from page text to the
//! typed records in [`records`].

pub mod fixture;
pub mod http_client;
pub mod identity;
pub mod parse;
pub mod rate_limiter;
pub mod records;

use async_trait::async_trait;
use thiserror::Error;

pub use crate::config::DEFAULT_BASE_URL as BASE_URL;
pub use fixture::FixtureSource;
pub use http_client::HttpClient;
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use records::{
    BatterRow, BowlerRow, InningsRec, MatchRec, PlayerRec, ProfileRec, ScorecardRec,
    SeriesRec, TeamRec,
};

/// Why a page could not be fetched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }
}

/// Anything that can produce the text of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch a page and return its body text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Make an upstream href absolute: `//host/x` gets a scheme and `/x` gets
/// the origin. Absolute URLs pass through.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url() {
        let base = "https://www.cricbuzz.com";
        assert_eq!(
            absolute_url(base, "//static.cricbuzz.com/a.png"),
            "https://static.cricbuzz.com/a.png"
        );
        assert_eq!(
            absolute_url(base, "/cricket-team/india/2"),
            "https://www.cricbuzz.com/cricket-team/india/2"
        );
        assert_eq!(
            absolute_url(base, "https://example.com/x"),
            "https://example.com/x"
        );
        assert_eq!(
            absolute_url("https://www.cricbuzz.com/", "profiles/1/x"),
            "https://www.cricbuzz.com/profiles/1/x"
        );
    }

    #[test]
    fn test_not_found() {
        let err = FetchError::Status {
            url: "u".into(),
            status: 404,
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("404"));
    }
}
