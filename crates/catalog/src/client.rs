use crate::error::{ErrorKind, Result};
use crate::models::{CatalogRecord, Page};
use crate::query::{CatalogQuery, QueryMode};
use cardscan_net::{FetchHandle, Request, Url};
use exn::{OptionExt, ResultExt};
use tracing::instrument;

/// Page size of the manual, multi-result search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
const API_KEY_HEADER: &str = "X-Api-Key";

/// Client for the remote card catalog.
///
/// Every lookup runs the same two-tier protocol: an exact name query first
/// and, only when that comes back empty, a prefix wildcard query. Failures
/// in either tier end the lookup immediately; they never fall through to
/// the next tier and are never retried.
#[derive(Clone)]
pub struct CatalogClient {
    fetcher: FetchHandle,
    base_url: Url,
    api_key: Option<String>,
}
impl CatalogClient {
    pub fn new(fetcher: FetchHandle, base_url: Url) -> Self {
        Self { fetcher, base_url, api_key: None }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Up to `max_results` records for `term`. An empty result means
    /// neither tier matched.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str, max_results: u32) -> Result<Vec<CatalogRecord>> {
        self.tiered(term, max_results).await
    }

    /// The single best record for `term`: the first record of whichever
    /// tier matched.
    #[instrument(skip(self))]
    pub async fn search_best(&self, term: &str) -> Result<CatalogRecord> {
        let records = self.tiered(term, 1).await?;
        records.into_iter().next().ok_or_raise(|| ErrorKind::NotFound(term.trim().to_string()))
    }

    async fn tiered(&self, term: &str, page_size: u32) -> Result<Vec<CatalogRecord>> {
        let term = term.trim();
        if term.is_empty() {
            exn::bail!(ErrorKind::EmptyQuery);
        }
        for mode in QueryMode::TIERS {
            let records = self.query(&CatalogQuery::new(term, mode, page_size)).await?;
            if !records.is_empty() {
                tracing::debug!(%mode, count = records.len(), "Catalog query matched");
                return Ok(records);
            }
            tracing::debug!(%mode, "Catalog query returned no records");
        }
        Ok(Vec::new())
    }

    /// Run a single query tier.
    pub async fn query(&self, query: &CatalogQuery) -> Result<Vec<CatalogRecord>> {
        let url = query.url(&self.base_url);
        let mut request = Request::get(url).with_header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.with_header(API_KEY_HEADER, key);
        }
        let response = self.fetcher.fetch(&request).await.or_raise(|| ErrorKind::Unavailable)?;
        if !response.is_success() {
            tracing::warn!(status = response.status, url = %request.url, "Catalog returned an error status");
            exn::bail!(ErrorKind::Unavailable);
        }
        let page: Page = response.json().or_raise(|| ErrorKind::Unavailable)?;
        if let Some(message) = page.error {
            exn::bail!(ErrorKind::Offline(message));
        }
        Ok(page.data.unwrap_or_default())
    }
}
