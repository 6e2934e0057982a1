//! Scripted fetcher for testing.

use crate::error::{ErrorKind, Result};
use crate::fetcher::{Fetcher, kind_for};
use crate::{Request, Response};
use async_trait::async_trait;
use reqwest::Url;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Scripted {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

/// In-memory fetcher for testing.
///
/// Responses are scripted per URL; anything unscripted answers `404`. Every
/// request is recorded, so tests can assert on what was (or wasn't) sent.
/// The whole fetcher can be switched offline, at which point every request
/// fails with [`Unreachable`](ErrorKind::Unreachable).
///
/// # Examples
///
/// ```
/// use cardscan_net::{Fetcher, MockFetcher};
/// use reqwest::Url;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = MockFetcher::with_responses([
///     ("https://example.com/data.json", 200, br#"{"ok":true}"#.as_slice()),
/// ]);
/// let response = fetcher.get(&Url::parse("https://example.com/data.json")?).await?;
/// assert_eq!(response.status, 200);
///
/// fetcher.set_offline(true);
/// assert!(fetcher.get(&Url::parse("https://example.com/data.json")?).await.is_err());
/// assert_eq!(fetcher.requests().await.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct MockFetcher {
    name: String,
    origin: Option<Url>,
    routes: RwLock<HashMap<String, Scripted>>,
    failing: RwLock<HashSet<String>>,
    requests: RwLock<Vec<Request>>,
    offline: AtomicBool,
}

impl MockFetcher {
    /// Create an empty mock fetcher: every URL answers `404`.
    pub fn new() -> Self {
        Self::with_responses(Vec::<(&str, u16, &[u8])>::new())
    }

    /// Create a mock fetcher pre-populated with `(url, status, body)`
    /// responses.
    ///
    /// Panics if any URL does not parse. If test setup is wrong, then test
    /// should not pass.
    pub fn with_responses<'a>(responses: impl IntoIterator<Item = (&'a str, u16, &'a [u8])>) -> Self {
        let mut routes = HashMap::new();
        for (url, status, body) in responses {
            let Ok(parsed) = Url::parse(url) else {
                panic!("MockFetcher::with_responses: invalid URL {url}");
            };
            routes.insert(parsed.to_string(), Scripted { status, headers: Vec::new(), body: body.to_vec() });
        }
        Self {
            name: "mock".to_string(),
            origin: None,
            routes: RwLock::new(routes),
            failing: RwLock::new(HashSet::new()),
            requests: RwLock::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        let Ok(parsed) = Url::parse(origin) else {
            panic!("MockFetcher::with_origin: invalid URL {origin}");
        };
        self.origin = Some(parsed);
        self
    }

    /// Script (or replace) the response for `url`.
    pub async fn respond(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) {
        let Ok(parsed) = Url::parse(url) else {
            panic!("MockFetcher::respond: invalid URL {url}");
        };
        let scripted = Scripted { status, headers: Vec::new(), body: body.into() };
        self.failing.write().await.remove(parsed.as_str());
        self.routes.write().await.insert(parsed.to_string(), scripted);
    }

    /// Make requests for `url` fail at the transport level.
    pub async fn fail(&self, url: &str) {
        let Ok(parsed) = Url::parse(url) else {
            panic!("MockFetcher::fail: invalid URL {url}");
        };
        self.failing.write().await.insert(parsed.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every request received so far, in order, including failed ones.
    pub async fn requests(&self) -> Vec<Request> {
        self.requests.read().await.clone()
    }

    /// Recorded requests whose URL starts with `prefix`.
    pub async fn requests_to(&self, prefix: &str) -> Vec<Request> {
        self.requests.read().await.iter().filter(|r| r.url.as_str().starts_with(prefix)).cloned().collect()
    }

    pub async fn clear_requests(&self) {
        self.requests.write().await.clear();
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, request: &Request) -> Result<Response> {
        self.requests.write().await.push(request.clone());
        let url = request.url.to_string();
        if self.offline.load(Ordering::SeqCst) || self.failing.read().await.contains(&url) {
            exn::bail!(ErrorKind::Unreachable(url));
        }
        let scripted = self.routes.read().await.get(&url).cloned();
        let Scripted { status, headers, body } =
            scripted.unwrap_or(Scripted { status: 404, headers: Vec::new(), body: Vec::new() });
        Ok(Response { url: request.url.clone(), status, kind: kind_for(self.origin.as_ref(), &request.url), headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResponseKind;

    #[tokio::test]
    async fn unscripted_urls_are_not_found() {
        let fetcher = MockFetcher::new();
        let response = fetcher.get(&Url::parse("https://example.com/missing").unwrap()).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn responses_can_be_rescripted() {
        let fetcher = MockFetcher::with_responses([("https://example.com/a", 500, b"".as_slice())]);
        fetcher.respond("https://example.com/a", 200, "fixed").await;
        let response = fetcher.get(&Url::parse("https://example.com/a").unwrap()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.text().unwrap(), "fixed");
    }

    #[tokio::test]
    async fn failing_urls_are_unreachable() {
        let fetcher = MockFetcher::with_responses([("https://example.com/a", 200, b"ok".as_slice())]);
        fetcher.fail("https://example.com/a").await;
        let err = fetcher.get(&Url::parse("https://example.com/a").unwrap()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unreachable(_)));
    }

    #[tokio::test]
    async fn offline_mode_records_but_fails() {
        let fetcher = MockFetcher::with_responses([("https://example.com/a", 200, b"ok".as_slice())]);
        fetcher.set_offline(true);
        assert!(fetcher.get(&Url::parse("https://example.com/a").unwrap()).await.is_err());
        fetcher.set_offline(false);
        assert!(fetcher.get(&Url::parse("https://example.com/a").unwrap()).await.is_ok());
        assert_eq!(fetcher.requests_to("https://example.com/").await.len(), 2);
    }

    #[tokio::test]
    async fn origin_controls_response_kind() {
        let fetcher = MockFetcher::with_responses([
            ("https://app.example/index.html", 200, b"<html>".as_slice()),
            ("https://cdn.example/lib.js", 200, b"js".as_slice()),
        ])
        .with_origin("https://app.example/");
        let local = fetcher.get(&Url::parse("https://app.example/index.html").unwrap()).await.unwrap();
        let remote = fetcher.get(&Url::parse("https://cdn.example/lib.js").unwrap()).await.unwrap();
        assert_eq!(local.kind, ResponseKind::Basic);
        assert_eq!(remote.kind, ResponseKind::Cors);
    }
}
