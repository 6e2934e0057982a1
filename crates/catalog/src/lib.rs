//! Card catalog lookups.
//!
//! [`CatalogClient`] talks to the remote catalog through a
//! [`Fetcher`](cardscan_net::Fetcher), so whatever sits behind the handle
//! (a plain HTTP client or the offline cache) sees every catalog request.

mod client;
pub mod display;
pub mod error;
mod models;
mod query;

pub use crate::client::{CatalogClient, DEFAULT_SEARCH_LIMIT};
pub use crate::models::{CardSet, CatalogRecord, Images, Market, Price, PriceTier};
pub use crate::query::{CatalogQuery, QueryMode};
