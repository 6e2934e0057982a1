use crate::error::{ErrorKind, Result};
use crate::generation::Generation;
use crate::lifecycle::Lifecycle;
use crate::manifest::Manifest;
use crate::policy::{Action, RoutingPolicy, is_cacheable, route};
use crate::store::{GenerationStore, StoreUsage};
use async_trait::async_trait;
use cardscan_net::{FetchHandle, Fetcher, Request, Response};
use exn::{OptionExt, ResultExt};
use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::instrument;

/// One generation-scoped store as seen by [`CacheManager::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub tag: String,
    pub usage: StoreUsage,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub lifecycle: Lifecycle,
    pub stores: Vec<StoreSummary>,
}

/// Offline cache sitting between the application and the network.
///
/// The manager is itself a [`Fetcher`]: hand it to anything that makes
/// requests and every request is routed through [`route`]. Only the manager
/// ever mutates the generation store.
pub struct CacheManager {
    network: FetchHandle,
    store: GenerationStore,
    policy: RoutingPolicy,
    manifest: Manifest,
    state: RwLock<Lifecycle>,
}
impl CacheManager {
    pub fn new(network: FetchHandle, store: GenerationStore, policy: RoutingPolicy, manifest: Manifest) -> Self {
        Self { network, store, policy, manifest, state: RwLock::new(Lifecycle::Uninitialized) }
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        self.state.read().await.clone()
    }

    pub async fn current(&self) -> Option<Generation> {
        self.state.read().await.current().cloned()
    }

    /// Resume the generation claimed by a previous run, if any.
    ///
    /// Only meaningful before anything else has happened; an unreadable
    /// pointer leaves the manager uninitialized rather than failing.
    pub async fn restore(&self) -> Result<Option<Generation>> {
        let mut state = self.state.write().await;
        if *state != Lifecycle::Uninitialized {
            return Ok(state.current().cloned());
        }
        match self.store.pointer().await {
            Ok(Some(generation)) => {
                tracing::debug!(%generation, "Restored active cache generation");
                *state = Lifecycle::Active(generation.clone());
                Ok(Some(generation))
            },
            Ok(None) => Ok(None),
            Err(e) if matches!(&*e, ErrorKind::InvalidGeneration(_)) => {
                tracing::warn!(error = ?e, "Ignoring unreadable cache pointer");
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    /// Fetch every manifest resource and store it under `generation`.
    ///
    /// All or nothing: every resource is fetched before anything is written,
    /// and a failed write removes whatever was already stored. Until
    /// [`activate`](Self::activate) runs, requests keep being served from the
    /// previously active generation.
    #[instrument(skip(self), fields(%generation))]
    pub async fn install(&self, generation: Generation) -> Result<usize> {
        {
            let mut state = self.state.write().await;
            *state = state.install(generation.clone())?;
        }
        let populated = self.populate(&generation).await;
        let mut state = self.state.write().await;
        match populated {
            Ok(stored) => {
                *state = state.finish()?;
                tracing::info!(stored, "Installed cache generation");
                Ok(stored)
            },
            Err(e) => {
                *state = state.abort();
                Err(e)
            },
        }
    }

    async fn populate(&self, generation: &Generation) -> Result<usize> {
        let requests: Vec<Request> = self.manifest.entries().iter().cloned().map(Request::get).collect();
        let responses = join_all(requests.iter().map(|request| self.network.fetch(request))).await;
        let mut fetched = Vec::with_capacity(requests.len());
        for (request, response) in requests.iter().zip(responses) {
            let response = response.or_raise(|| ErrorKind::Install(request.url.to_string()))?;
            if !response.is_success() {
                tracing::warn!(url = %request.url, status = response.status, "Manifest resource unavailable");
                exn::bail!(ErrorKind::Install(request.url.to_string()));
            }
            fetched.push((request, response));
        }
        for (request, response) in &fetched {
            if let Err(e) = self.store.put(generation, request, response).await {
                if let Err(cleanup) = self.store.purge(&generation.to_string()).await {
                    tracing::warn!(error = ?cleanup, "Failed to remove partial cache generation");
                }
                return Err(e).or_raise(|| ErrorKind::Install(request.url.to_string()));
            }
        }
        Ok(fetched.len())
    }

    /// Make the installed generation current, delete every other one, and
    /// persist the choice.
    ///
    /// Only a finished installation can be activated; one still fetching is
    /// [`Busy`](ErrorKind::Busy). The cutover is immediate: from the moment
    /// purging starts, lookups and stores target the new generation. Failing
    /// to persist the choice still claims the generation for this process.
    #[instrument(skip(self))]
    pub async fn activate(&self) -> Result<Generation> {
        let generation = {
            let mut state = self.state.write().await;
            *state = state.purge()?;
            state.current().cloned().ok_or_raise(|| ErrorKind::NothingToActivate)?
        };
        match self.store.purge_except(&generation).await {
            Ok(purged) => tracing::debug!(purged = purged.len(), "Removed stale generations"),
            // Stale stores are unreachable once the new generation is current.
            Err(e) => tracing::warn!(error = ?e, "Failed to purge stale cache generations"),
        }
        // Claim: only now does a restarted process resume from this generation.
        if let Err(e) = self.store.set_pointer(&generation).await {
            tracing::warn!(%generation, error = ?e, "Failed to persist active cache generation");
        }
        let mut state = self.state.write().await;
        *state = state.claim()?;
        tracing::info!(%generation, "Activated cache generation");
        Ok(generation)
    }

    /// [`install`](Self::install) followed by [`activate`](Self::activate).
    pub async fn upgrade(&self, generation: Generation) -> Result<Generation> {
        self.install(generation).await?;
        self.activate().await
    }

    pub async fn status(&self) -> Result<CacheStatus> {
        let lifecycle = self.lifecycle().await;
        let current = lifecycle.current().map(ToString::to_string);
        let mut stores = Vec::new();
        for tag in self.store.tags().await? {
            let usage = self.store.usage(&tag).await?;
            stores.push(StoreSummary { current: current.as_deref() == Some(tag.as_str()), tag, usage });
        }
        Ok(CacheStatus { lifecycle, stores })
    }
}

#[async_trait]
impl Fetcher for CacheManager {
    fn name(&self) -> &str {
        "offline"
    }

    async fn fetch(&self, request: &Request) -> cardscan_net::error::Result<Response> {
        let current = self.current().await;
        match route(request, &self.store, &self.policy, current.as_ref()).await {
            Action::Serve(response) => Ok(response),
            Action::Fetch { store_under } => {
                let response = self.network.fetch(request).await?;
                if let Some(generation) = store_under
                    && is_cacheable(&response)
                    && let Err(e) = self.store.put(&generation, request, &response).await
                {
                    tracing::warn!(%generation, url = %request.url, error = ?e, "Failed to cache response");
                }
                Ok(response)
            },
            Action::FetchOrSynthesize { fallback } => match self.network.fetch(request).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    tracing::warn!(url = %request.url, error = ?e, "Network-only request failed; answering offline");
                    Ok(fallback)
                },
            },
        }
    }
}
