//! Blob storage for cached responses.
//!
//! The offline cache persists every stored response as a pair of blobs
//! under a generation directory. This crate only knows about relative paths
//! and bytes; what they mean is up to the caller.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::BlobInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
