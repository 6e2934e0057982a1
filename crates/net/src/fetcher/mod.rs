//! Fetcher trait and implementations.
//!
//! This module defines the `Fetcher` trait, the single seam every outgoing
//! request passes through. Anything that wants to observe or intercept
//! traffic (the offline cache, tests) wraps or replaces a fetcher rather
//! than talking to an HTTP client directly.

mod http;
#[cfg(feature = "mock")]
mod mock;

pub use self::http::HttpFetcher;
#[cfg(feature = "mock")]
pub use self::mock::MockFetcher;
use crate::error::Result;
use crate::{Request, Response};
use async_trait::async_trait;
use reqwest::Url;

/// Unified interface for performing network requests.
///
/// A non-success HTTP status is still `Ok`: only transport failures (no
/// response at all) are errors. Callers decide what a `404` means to them.
///
/// # Examples
///
/// ```
/// use cardscan_net::{Fetcher, Request, error::Result};
///
/// async fn body_length(fetcher: &dyn Fetcher, url: &str) -> Result<usize> {
///     let response = fetcher.fetch(&Request::get_str(url)?).await?;
///     Ok(if response.is_success() { response.body.len() } else { 0 })
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Name of the fetcher, used for logging only.
    fn name(&self) -> &str;

    async fn fetch(&self, request: &Request) -> Result<Response>;

    /// Convenience wrapper for a header-less `GET`.
    async fn get(&self, url: &Url) -> Result<Response> {
        self.fetch(&Request::get(url.clone())).await
    }
}

/// Classify a response for `target` relative to the application `origin`.
pub(crate) fn kind_for(origin: Option<&Url>, target: &Url) -> crate::ResponseKind {
    match origin {
        Some(origin) if origin.origin() == target.origin() => crate::ResponseKind::Basic,
        _ => crate::ResponseKind::Cors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResponseKind;

    #[test]
    fn same_origin_is_basic() {
        let origin = Url::parse("https://scanner.example/").unwrap();
        let target = Url::parse("https://scanner.example/app.js").unwrap();
        assert_eq!(kind_for(Some(&origin), &target), ResponseKind::Basic);
    }

    #[test]
    fn other_origins_are_cors() {
        let origin = Url::parse("https://scanner.example/").unwrap();
        let target = Url::parse("https://cdn.jsdelivr.net/npm/tesseract.js@5/dist/tesseract.min.js").unwrap();
        assert_eq!(kind_for(Some(&origin), &target), ResponseKind::Cors);
        assert_eq!(kind_for(None, &target), ResponseKind::Cors);
        // Scheme and port are part of the origin.
        let insecure = Url::parse("http://scanner.example/app.js").unwrap();
        assert_eq!(kind_for(Some(&origin), &insecure), ResponseKind::Cors);
    }
}
