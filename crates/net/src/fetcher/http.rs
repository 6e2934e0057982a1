use crate::error::{ErrorKind, Result};
use crate::fetcher::{Fetcher, kind_for};
use crate::{Request, Response};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::instrument;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("cardscan/", env!("CARGO_PKG_VERSION"));

/// Fetcher backed by a real HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    name: String,
    client: Client,
    origin: Option<Url>,
}
impl HttpFetcher {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_timeout(name, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(name: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).timeout(timeout).build().map_err(|e| {
            tracing::error!(error = %e, "Failed to build HTTP client");
            ErrorKind::Client
        })?;
        Ok(Self { name: name.into(), client, origin: None })
    }

    /// Responses from `origin` are classified as
    /// [`Basic`](crate::ResponseKind::Basic); everything else is
    /// [`Cors`](crate::ResponseKind::Cors).
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    fn map_transport_error(e: reqwest::Error, url: &Url) -> ErrorKind {
        if e.is_timeout() {
            ErrorKind::Timeout(url.to_string())
        } else if e.is_builder() {
            ErrorKind::InvalidUrl(url.to_string())
        } else {
            tracing::debug!(error = %e, %url, "Transport failure");
            ErrorKind::Unreachable(url.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(fetcher = %self.name))]
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let mut builder = self.client.request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let response = builder.send().await.map_err(|e| Self::map_transport_error(e, &request.url))?;
        let url = response.url().clone();
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await.map_err(|e| Self::map_transport_error(e, &url))?.to_vec();
        tracing::debug!(status, bytes = body.len(), "Fetched");
        Ok(Response { kind: kind_for(self.origin.as_ref(), &url), url, status, headers, body })
    }
}
