pub mod error;
pub mod fetcher;
mod request;
mod response;

#[cfg(feature = "mock")]
pub use crate::fetcher::MockFetcher;
pub use crate::fetcher::{Fetcher, HttpFetcher};
pub use crate::request::Request;
pub use crate::response::{Response, ResponseKind};
pub use reqwest::{Method, Url};
use std::sync::Arc;

pub type FetchHandle = Arc<dyn Fetcher + Send + Sync>;
