//! Per-request routing.
//!
//! [`route`] decides what happens to an intercepted request; it never touches
//! the network itself. The [`CacheManager`](crate::CacheManager) carries out
//! the decision.

use crate::generation::Generation;
use crate::store::GenerationStore;
use cardscan_net::{Method, Request, Response, ResponseKind};
use serde_json::json;

pub const DEFAULT_NETWORK_ONLY_HOST: &str = "api.pokemontcg.io";
pub const DEFAULT_OFFLINE_MESSAGE: &str = "Offline - no connection to the card catalog";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Always go to the network; never read or write the store.
    NetworkOnly,
    /// Serve from the current generation when possible.
    CacheFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPolicy {
    network_only_hosts: Vec<String>,
    offline_message: String,
}
impl RoutingPolicy {
    pub fn new(network_only_hosts: impl IntoIterator<Item = impl Into<String>>, offline_message: impl Into<String>) -> Self {
        Self {
            network_only_hosts: network_only_hosts.into_iter().map(Into::into).collect(),
            offline_message: offline_message.into(),
        }
    }

    pub fn strategy_for(&self, request: &Request) -> Strategy {
        let network_only = request
            .host()
            .is_some_and(|host| self.network_only_hosts.iter().any(|candidate| candidate.eq_ignore_ascii_case(host)));
        match network_only {
            true => Strategy::NetworkOnly,
            false => Strategy::CacheFirst,
        }
    }

    pub fn offline_message(&self) -> &str {
        &self.offline_message
    }

    /// Stand-in answer for a network-only request that couldn't reach the
    /// network: a successful JSON payload carrying only an `error` field.
    pub fn offline_response(&self, request: &Request) -> Response {
        Response::synthetic_json(request.url.clone(), &json!({ "error": self.offline_message }))
    }
}
impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::new([DEFAULT_NETWORK_ONLY_HOST], DEFAULT_OFFLINE_MESSAGE)
    }
}

/// Only plain `200 OK` same-origin responses are worth keeping.
pub fn is_cacheable(response: &Response) -> bool {
    response.status == 200 && response.kind == ResponseKind::Basic
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Answer with a stored response; the network is not involved.
    Serve(Response),
    /// Go to the network. A cacheable response is copied into `store_under`
    /// before being returned.
    Fetch { store_under: Option<Generation> },
    /// Go to the network; on transport failure answer with `fallback`
    /// instead of failing.
    FetchOrSynthesize { fallback: Response },
}

/// Decide how to handle `request` given the generation currently in charge.
///
/// Store failures are treated as a miss: a broken cache degrades to the
/// network, it never fails a request by itself.
pub async fn route(
    request: &Request,
    store: &GenerationStore,
    policy: &RoutingPolicy,
    current: Option<&Generation>,
) -> Action {
    if policy.strategy_for(request) == Strategy::NetworkOnly {
        return Action::FetchOrSynthesize { fallback: policy.offline_response(request) };
    }
    // Only idempotent reads are ever stored.
    if request.method != Method::GET {
        return Action::Fetch { store_under: None };
    }
    let Some(generation) = current else {
        return Action::Fetch { store_under: None };
    };
    let hit = match store.lookup(generation, request).await {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(%generation, url = %request.url, error = ?e, "Cache lookup failed; treating as a miss");
            None
        },
    };
    if let Some(entry) = hit {
        match entry.into_response() {
            Ok(response) => {
                tracing::trace!(%generation, url = %request.url, "Serving from cache");
                return Action::Serve(response);
            },
            Err(e) => tracing::warn!(%generation, error = ?e, "Discarding unreadable cache entry"),
        }
    }
    Action::Fetch { store_under: Some(generation.clone()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscan_net::Url;
    use cardscan_storage::backend::MockBackend;
    use rstest::rstest;
    use std::sync::Arc;

    fn generation(version: u32) -> Generation {
        Generation::new("cardscan", version).unwrap()
    }

    fn request(url: &str) -> Request {
        Request::get_str(url).unwrap()
    }

    fn store() -> GenerationStore {
        GenerationStore::new(Arc::new(MockBackend::default()))
    }

    #[rstest]
    #[case("https://api.pokemontcg.io/v2/cards?q=name:Onix", Strategy::NetworkOnly)]
    #[case("https://API.POKEMONTCG.IO/v2/cards", Strategy::NetworkOnly)]
    #[case("https://images.pokemontcg.io/base1/4.png", Strategy::CacheFirst)]
    #[case("https://scanner.example/app.js", Strategy::CacheFirst)]
    fn strategy_by_host(#[case] url: &str, #[case] expected: Strategy) {
        assert_eq!(RoutingPolicy::default().strategy_for(&request(url)), expected);
    }

    #[test]
    fn offline_payload_shape() {
        let policy = RoutingPolicy::new(["api.pokemontcg.io"], "You are offline");
        let response = policy.offline_response(&request("https://api.pokemontcg.io/v2/cards"));
        assert_eq!(response.status, 200);
        assert_eq!(response.kind, ResponseKind::Synthetic);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value, json!({ "error": "You are offline" }));
    }

    #[rstest]
    #[case(200, ResponseKind::Basic, true)]
    #[case(200, ResponseKind::Cors, false)]
    #[case(200, ResponseKind::Opaque, false)]
    #[case(204, ResponseKind::Basic, false)]
    #[case(404, ResponseKind::Basic, false)]
    fn cacheability(#[case] status: u16, #[case] kind: ResponseKind, #[case] expected: bool) {
        let response =
            Response { url: Url::parse("https://scanner.example/").unwrap(), status, kind, headers: vec![], body: vec![] };
        assert_eq!(is_cacheable(&response), expected);
    }

    #[tokio::test]
    async fn catalog_requests_are_never_served_from_store() {
        let store = store();
        let catalog = request("https://api.pokemontcg.io/v2/cards");
        let stored = Response::synthetic_json(catalog.url.clone(), &json!({ "data": [] }));
        store.put(&generation(1), &catalog, &stored).await.unwrap();
        let action = route(&catalog, &store, &RoutingPolicy::default(), Some(&generation(1))).await;
        assert!(matches!(action, Action::FetchOrSynthesize { .. }));
    }

    #[tokio::test]
    async fn hits_are_served_verbatim() {
        let store = store();
        let asset = request("https://scanner.example/style.css");
        let stored = Response {
            url: asset.url.clone(),
            status: 200,
            kind: ResponseKind::Basic,
            headers: vec![],
            body: b"body{}".to_vec(),
        };
        store.put(&generation(1), &asset, &stored).await.unwrap();
        let action = route(&asset, &store, &RoutingPolicy::default(), Some(&generation(1))).await;
        assert_eq!(action, Action::Serve(stored));
    }

    #[tokio::test]
    async fn misses_fetch_into_current_generation() {
        let action =
            route(&request("https://scanner.example/app.js"), &store(), &RoutingPolicy::default(), Some(&generation(2)))
                .await;
        assert_eq!(action, Action::Fetch { store_under: Some(generation(2)) });
    }

    #[tokio::test]
    async fn nothing_is_stored_without_a_generation() {
        let action = route(&request("https://scanner.example/app.js"), &store(), &RoutingPolicy::default(), None).await;
        assert_eq!(action, Action::Fetch { store_under: None });
    }

    #[tokio::test]
    async fn non_get_requests_bypass_the_store() {
        let post = Request::new(Method::POST, Url::parse("https://scanner.example/upload").unwrap());
        let action = route(&post, &store(), &RoutingPolicy::default(), Some(&generation(1))).await;
        assert_eq!(action, Action::Fetch { store_under: None });
    }

    #[tokio::test]
    async fn broken_store_degrades_to_network() {
        let asset = request("https://scanner.example/app.js");
        let meta = format!("cardscan-v1/{}.meta", GenerationStore::key(&asset));
        let store = GenerationStore::new(Arc::new(MockBackend::with_blobs([(meta, b"{".to_vec())])));
        let action = route(&asset, &store, &RoutingPolicy::default(), Some(&generation(1))).await;
        assert_eq!(action, Action::Fetch { store_under: Some(generation(1)) });
    }
}
