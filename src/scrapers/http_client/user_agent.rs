//! Browser-like request headers.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};

/// The upstream serves reduced pages to unknown clients, so requests present
/// as a desktop browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Default header set sent with every request.
///
/// `Accept-Encoding` is added by the client itself from its gzip/brotli
/// settings so responses are decoded transparently.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        "upgrade-insecure-requests",
        HeaderValue::from_static("1"),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        assert!(headers[USER_AGENT].to_str().unwrap().contains("Mozilla"));
        assert_eq!(headers[CONNECTION], "keep-alive");
        assert_eq!(headers["upgrade-insecure-requests"], "1");
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }
}
