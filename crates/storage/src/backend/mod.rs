//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait: a small, async blob store
//! addressed by relative paths. The offline cache is its only consumer.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::{ErrorKind, Result};
use crate::models::BlobInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

type BlobInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<BlobInfo>> + Send + 'a>>;

/// Unified interface for blob storage backends.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cardscan_storage::{backend::StorageBackend, error::Result};
///
/// async fn cached_body_len(backend: &dyn StorageBackend) -> Result<usize> {
///     let path = Path::new("cardscan-v1/4f2a.body");
///     Ok(backend.read_optional(path).await?.map_or(0, |body| body.len()))
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend. Used for logging only.
    fn name(&self) -> &str;

    /// List all blobs matching an optional prefix.
    ///
    /// Default implementation of this method is to collect all the results
    /// from [`list_stream()`](Self::list_stream) into a [`Vec`] before
    /// returning.
    async fn list(&self, prefix: Option<&Path>) -> Result<Vec<BlobInfo>> {
        self.list_stream(prefix).try_collect().await
    }

    /// Stream blob metadata matching an optional prefix.
    ///
    /// Prefixes are matched per path component: `cardscan-v1` matches
    /// `cardscan-v1/4f2a.meta` but not `cardscan-v10/4f2a.meta`. Listing a
    /// prefix that doesn't exist yields nothing rather than an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// use std::path::Path;
    /// # use cardscan_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream(Some(Path::new("cardscan-v1")));
    /// while let Some(info) = stream.try_next().await? {
    ///     println!("{}: {} bytes", info.path.display(), info.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> BlobInfoStream<'a>;

    /// Read blob contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the blob
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Read a blob, mapping absence to `None` instead of an error.
    async fn read_optional(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match self.read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if matches!(&*e, ErrorKind::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write blob contents, replacing anything already stored at `path`.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    /// - Readers must never observe a partially written blob.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Delete a blob.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the blob
    /// does not exist.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Delete every blob under `prefix`, returning how many were removed.
    ///
    /// Default implementation lists then deletes one by one; blobs that
    /// vanish in between are not counted and not treated as errors.
    async fn delete_prefix(&self, prefix: &Path) -> Result<usize> {
        let mut removed = 0;
        for info in self.list(Some(prefix)).await? {
            match self.delete(&info.path).await {
                Ok(()) => removed += 1,
                Err(e) if matches!(&*e, ErrorKind::NotFound(_)) => {},
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }
}
