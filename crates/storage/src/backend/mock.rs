//! In-memory storage backend for testing.

use super::BlobInfoStream;
use crate::error::{ErrorKind, Result};
use crate::models::BlobInfo;
use crate::path::validate as validate_path;
use crate::StorageBackend;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Blobs live in a sorted map behind a [`RwLock`], so listings come back in
/// path order. Writes can be made to fail on demand to exercise error
/// handling in callers.
///
/// # Examples
///
/// ```
/// use cardscan_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_blobs([("_active", b"cardscan-v1")]);
/// assert_eq!(backend.read(Path::new("_active")).await?, b"cardscan-v1");
///
/// backend.fail_writes(true);
/// assert!(backend.write(Path::new("cardscan-v1/a.meta"), b"{}").await.is_err());
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<BTreeMap<PathBuf, (OffsetDateTime, Vec<u8>)>>,
    fail_writes: AtomicBool,
}

impl MockBackend {
    /// Create a mock backend pre-populated with blobs.
    ///
    /// Panics if any path fails validation. If test setup is wrong, then
    /// test should not pass.
    pub fn with_blobs(blobs: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = BTreeMap::new();
        let now = OffsetDateTime::now_utc();
        for (path, data) in blobs {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MockBackend::with_blobs: invalid path {}", path.display());
            };
            map.insert(validated, (now, data.into()));
        }
        Self { name: "mock".to_string(), storage: RwLock::new(map), fail_writes: AtomicBool::new(false) }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make every subsequent write fail with an I/O error (or stop doing so).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every stored path, sorted.
    pub async fn paths(&self) -> Vec<PathBuf> {
        self.storage.read().await.keys().cloned().collect()
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let blobs: [(&str, &str); 0] = [];
        Self::with_blobs(blobs)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> BlobInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            // Snapshot under the read lock; never hold it across a yield.
            let entries: Vec<BlobInfo> = {
                let guard = self.storage.read().await;
                guard
                    .iter()
                    .filter(|(path, _)| validated_prefix.as_ref().is_none_or(|pfx| path.starts_with(pfx)))
                    .map(|(path, (modified, data))| BlobInfo::new(path.clone(), data.len() as u64, *modified))
                    .collect()
            };
            for info in entries {
                yield Ok(info);
            }
        })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        let (_modified, data) =
            self.storage.read().await.get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))?;
        Ok(data)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Io(std::io::Error::other(format!("refusing to write {}", path.display()))));
        }
        self.storage.write().await.insert(path, (OffsetDateTime::now_utc(), data.to_vec()));
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        self.storage.write().await.remove(&path).map(|_| ()).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_read() {
        let backend = MockBackend::default();
        backend.write(Path::new("cardscan-v1/a.body"), b"hello").await.unwrap();
        assert_eq!(backend.read(Path::new("cardscan-v1/a.body")).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn read_not_found() {
        let backend = MockBackend::default();
        let err = backend.read(Path::new("missing")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn failing_writes_store_nothing() {
        let backend = MockBackend::default();
        backend.fail_writes(true);
        let err = backend.write(Path::new("a.meta"), b"{}").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(backend.paths().await.is_empty());
        backend.fail_writes(false);
        backend.write(Path::new("a.meta"), b"{}").await.unwrap();
        assert_eq!(backend.paths().await, vec![PathBuf::from("a.meta")]);
    }

    #[tokio::test]
    async fn listing_is_sorted_and_prefix_filtered() {
        let backend = MockBackend::with_blobs([
            ("cardscan-v2/b.meta", b"2".to_vec()),
            ("cardscan-v1/a.meta", b"1".to_vec()),
            ("cardscan-v10/c.meta", b"3".to_vec()),
        ]);
        let all: Vec<_> = backend.list(None).await.unwrap().into_iter().map(|info| info.path).collect();
        assert_eq!(
            all,
            vec![
                PathBuf::from("cardscan-v1/a.meta"),
                PathBuf::from("cardscan-v10/c.meta"),
                PathBuf::from("cardscan-v2/b.meta"),
            ]
        );
        assert_eq!(backend.list(Some(Path::new("cardscan-v1"))).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn default_delete_prefix() {
        let backend = MockBackend::with_blobs([
            ("cardscan-v1/a.meta", b"1".to_vec()),
            ("cardscan-v1/a.body", b"1".to_vec()),
            ("cardscan-v2/b.meta", b"2".to_vec()),
        ]);
        assert_eq!(backend.delete_prefix(Path::new("cardscan-v1")).await.unwrap(), 2);
        assert_eq!(backend.paths().await, vec![PathBuf::from("cardscan-v2/b.meta")]);
    }

    #[tokio::test]
    async fn listing_reports_size() {
        let backend = MockBackend::with_blobs([("a.body", b"12345".to_vec())]);
        let listed = backend.list(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, PathBuf::from("a.body"));
        assert_eq!(listed[0].size, 5);
    }

    #[tokio::test]
    async fn traversal_rejected() {
        let backend = MockBackend::default();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("../escape"), b"bad").await.is_err());
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn with_blobs_panics_on_bad_path() {
        MockBackend::with_blobs([("../escape", b"bad".to_vec())]);
    }
}
