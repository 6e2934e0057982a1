//! Generational offline cache for cardscan.
//!
//! A [`CacheManager`] wraps the real network [`Fetcher`](cardscan_net::Fetcher)
//! and answers every request according to its [`RoutingPolicy`]: catalog
//! traffic always goes to the network (with a synthetic offline answer when
//! that fails), everything else is served cache-first from the generation
//! currently in charge.

pub mod error;
mod generation;
mod lifecycle;
mod manager;
mod manifest;
pub mod policy;
mod store;

pub use crate::generation::Generation;
pub use crate::lifecycle::Lifecycle;
pub use crate::manager::{CacheManager, CacheStatus, StoreSummary};
pub use crate::manifest::Manifest;
pub use crate::policy::{Action, RoutingPolicy, Strategy, is_cacheable, route};
pub use crate::store::{CachedEntry, EntryMeta, GenerationStore, StoreUsage};
