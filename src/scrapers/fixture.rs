//! Canned pages served through [`PageSource`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{FetchError, PageSource};

/// Serves pages from memory and records every requested URL. Unknown URLs
/// answer 404.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    pages: HashMap<String, String>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageSource for FixtureSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_pages() {
        let source = FixtureSource::new().with_page("https://x/a", "<p>a</p>");
        assert_eq!(source.fetch("https://x/a").await.unwrap(), "<p>a</p>");
        assert!(source.fetch("https://x/b").await.unwrap_err().is_not_found());
        assert_eq!(source.requests(), vec!["https://x/a", "https://x/b"]);
    }
}
