//! Generation-scoped response store.
//!
//! Layout inside the backend:
//!
//! ```text
//! _active                     current generation tag, written on claim
//! <generation>/<hash>.body    response body, verbatim
//! <generation>/<hash>.meta    JSON metadata; an entry only exists once this
//!                             is written, so it always goes last
//! ```
//!
//! `<hash>` is the BLAKE3 digest of the request's method and URL.

use crate::error::{ErrorKind, Result};
use crate::generation::Generation;
use cardscan_net::{Request, Response, ResponseKind, Url};
use cardscan_storage::{BackendHandle, StorageBackend};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use time::{OffsetDateTime, UtcDateTime};

const POINTER: &str = "_active";
const META_EXTENSION: &str = "meta";
const BODY_EXTENSION: &str = "body";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    /// Unix timestamp (seconds).
    pub stored_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub meta: EntryMeta,
    pub body: Vec<u8>,
}
impl CachedEntry {
    pub fn stored_at(&self) -> Option<UtcDateTime> {
        UtcDateTime::from_unix_timestamp(self.meta.stored_at).ok()
    }

    pub fn into_response(self) -> Result<Response> {
        let url = Url::parse(&self.meta.url).or_raise(|| ErrorKind::CorruptEntry(self.meta.url.clone()))?;
        Ok(Response { url, status: self.meta.status, kind: self.meta.kind, headers: self.meta.headers, body: self.body })
    }
}

/// Disk usage of one generation-scoped store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreUsage {
    /// Complete entries, i.e. those with metadata written.
    pub entries: usize,
    /// Bytes across every blob, bodies and metadata alike.
    pub bytes: u64,
    /// Most recent write.
    pub updated: Option<OffsetDateTime>,
}

/// Stores responses per [`Generation`] on top of a storage backend.
#[derive(Clone)]
pub struct GenerationStore {
    backend: BackendHandle,
}
impl GenerationStore {
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn key(request: &Request) -> String {
        blake3::hash(request.key().as_bytes()).to_hex().to_string()
    }

    fn entry_path(generation: &Generation, request: &Request, extension: &str) -> PathBuf {
        PathBuf::from(generation.to_string()).join(format!("{}.{extension}", Self::key(request)))
    }

    /// Look up `request` in `generation`. Entries whose body has gone missing
    /// count as absent.
    pub async fn lookup(&self, generation: &Generation, request: &Request) -> Result<Option<CachedEntry>> {
        let meta_path = Self::entry_path(generation, request, META_EXTENSION);
        let Some(meta) = self.backend.read_optional(&meta_path).await.or_raise(|| ErrorKind::Storage)? else {
            return Ok(None);
        };
        let meta: EntryMeta =
            serde_json::from_slice(&meta).or_raise(|| ErrorKind::CorruptEntry(meta_path.display().to_string()))?;
        let body_path = Self::entry_path(generation, request, BODY_EXTENSION);
        let Some(body) = self.backend.read_optional(&body_path).await.or_raise(|| ErrorKind::Storage)? else {
            tracing::warn!(path = %body_path.display(), "Cache entry is missing its body");
            return Ok(None);
        };
        Ok(Some(CachedEntry { meta, body }))
    }

    /// Store a copy of `response` for `request`, replacing any previous entry.
    pub async fn put(&self, generation: &Generation, request: &Request, response: &Response) -> Result<()> {
        let meta = EntryMeta {
            method: request.method.to_string(),
            url: request.url.to_string(),
            status: response.status,
            kind: response.kind,
            headers: response.headers.clone(),
            stored_at: UtcDateTime::now().unix_timestamp(),
        };
        let meta = serde_json::to_vec(&meta).or_raise(|| ErrorKind::Storage)?;
        let body_path = Self::entry_path(generation, request, BODY_EXTENSION);
        self.backend.write(&body_path, &response.body).await.or_raise(|| ErrorKind::Storage)?;
        let meta_path = Self::entry_path(generation, request, META_EXTENSION);
        self.backend.write(&meta_path, &meta).await.or_raise(|| ErrorKind::Storage)?;
        Ok(())
    }

    /// Names of every generation-scoped store present, whether or not they
    /// parse as a [`Generation`].
    pub async fn tags(&self) -> Result<Vec<String>> {
        let blobs = self.backend.list(None).await.or_raise(|| ErrorKind::Storage)?;
        let tags: BTreeSet<String> = blobs.iter().filter_map(|info| info.top_level()).map(str::to_string).collect();
        Ok(tags.into_iter().collect())
    }

    pub async fn usage(&self, tag: &str) -> Result<StoreUsage> {
        let blobs = self.backend.list(Some(Path::new(tag))).await.or_raise(|| ErrorKind::Storage)?;
        Ok(blobs.iter().fold(StoreUsage::default(), |mut usage, info| {
            if info.has_extension(META_EXTENSION) {
                usage.entries += 1;
            }
            usage.bytes += info.size;
            usage.updated = usage.updated.max(Some(info.modified));
            usage
        }))
    }

    /// Delete the store named `tag`, returning how many blobs were removed.
    pub async fn purge(&self, tag: &str) -> Result<usize> {
        self.backend.delete_prefix(Path::new(tag)).await.or_raise(|| ErrorKind::Storage)
    }

    /// Delete every store other than `keep`, returning the deleted tags.
    pub async fn purge_except(&self, keep: &Generation) -> Result<Vec<String>> {
        let keep = keep.to_string();
        let mut purged = Vec::new();
        for tag in self.tags().await? {
            if tag == keep {
                continue;
            }
            let removed = self.purge(&tag).await?;
            tracing::info!(generation = %tag, removed, "Purged stale cache generation");
            purged.push(tag);
        }
        Ok(purged)
    }

    /// The persisted current generation, if one was ever claimed.
    pub async fn pointer(&self) -> Result<Option<Generation>> {
        let Some(raw) = self.backend.read_optional(Path::new(POINTER)).await.or_raise(|| ErrorKind::Storage)? else {
            return Ok(None);
        };
        let tag = String::from_utf8_lossy(&raw);
        Ok(Some(tag.parse()?))
    }

    pub async fn set_pointer(&self, generation: &Generation) -> Result<()> {
        let tag = generation.to_string();
        self.backend.write(Path::new(POINTER), tag.as_bytes()).await.or_raise(|| ErrorKind::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardscan_storage::backend::{LocalBackend, MockBackend};
    use std::sync::Arc;

    fn generation(version: u32) -> Generation {
        Generation::new("cardscan", version).unwrap()
    }

    fn request(url: &str) -> Request {
        Request::get_str(url).unwrap()
    }

    fn response(url: &str, body: &str) -> Response {
        Response {
            url: Url::parse(url).unwrap(),
            status: 200,
            kind: ResponseKind::Basic,
            headers: vec![("Content-Type".to_string(), "text/css".to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn put_then_lookup() {
        let store = GenerationStore::new(Arc::new(MockBackend::default()));
        let url = "https://scanner.example/style.css";
        store.put(&generation(1), &request(url), &response(url, "body{}")).await.unwrap();
        let entry = store.lookup(&generation(1), &request(url)).await.unwrap().unwrap();
        assert!(entry.stored_at().is_some());
        let served = entry.into_response().unwrap();
        assert_eq!(served, response(url, "body{}"));
    }

    #[tokio::test]
    async fn lookups_are_scoped_to_generation() {
        let store = GenerationStore::new(Arc::new(MockBackend::default()));
        let url = "https://scanner.example/app.js";
        store.put(&generation(1), &request(url), &response(url, "v1")).await.unwrap();
        assert!(store.lookup(&generation(2), &request(url)).await.unwrap().is_none());
        assert!(store.lookup(&generation(1), &request("https://scanner.example/other.js")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entries_without_body_are_absent() {
        let backend = Arc::new(MockBackend::default());
        let store = GenerationStore::new(backend.clone());
        let url = "https://scanner.example/app.js";
        store.put(&generation(1), &request(url), &response(url, "v1")).await.unwrap();
        let body = format!("cardscan-v1/{}.body", GenerationStore::key(&request(url)));
        backend.delete(Path::new(&body)).await.unwrap();
        assert!(store.lookup(&generation(1), &request(url)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_metadata_is_reported() {
        let url = "https://scanner.example/app.js";
        let meta = format!("cardscan-v1/{}.meta", GenerationStore::key(&request(url)));
        let store = GenerationStore::new(Arc::new(MockBackend::with_blobs([(meta, b"not json".to_vec())])));
        let err = store.lookup(&generation(1), &request(url)).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::CorruptEntry(_)));
    }

    #[tokio::test]
    async fn purge_except_keeps_only_the_given_generation() {
        let store = GenerationStore::new(Arc::new(MockBackend::default()));
        let url = "https://scanner.example/";
        for version in 1..=3 {
            store.put(&generation(version), &request(url), &response(url, "shell")).await.unwrap();
        }
        store.set_pointer(&generation(3)).await.unwrap();
        assert_eq!(store.tags().await.unwrap(), vec!["cardscan-v1", "cardscan-v2", "cardscan-v3"]);
        let purged = store.purge_except(&generation(3)).await.unwrap();
        assert_eq!(purged, vec!["cardscan-v1", "cardscan-v2"]);
        assert_eq!(store.tags().await.unwrap(), vec!["cardscan-v3"]);
        let usage = store.usage("cardscan-v3").await.unwrap();
        assert_eq!(usage.entries, 1);
        assert!(usage.updated.is_some());
        // The pointer lives outside every generation and survives purging.
        assert_eq!(store.pointer().await.unwrap(), Some(generation(3)));
    }

    #[tokio::test]
    async fn usage_counts_bodies_and_metadata() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = GenerationStore::new(Arc::new(LocalBackend::new("local", temp_dir.path()).unwrap()));
        let url = "https://scanner.example/app.js";
        store.put(&generation(1), &request(url), &response(url, "console.log(1)")).await.unwrap();
        let meta_path = GenerationStore::entry_path(&generation(1), &request(url), META_EXTENSION);
        let meta_len = store.backend.read(&meta_path).await.unwrap().len() as u64;

        let usage = store.usage("cardscan-v1").await.unwrap();
        assert_eq!(usage.entries, 1);
        assert_eq!(usage.bytes, "console.log(1)".len() as u64 + meta_len);
        assert_eq!(store.usage("cardscan-v9").await.unwrap(), StoreUsage::default());
    }

    #[tokio::test]
    async fn pointer_round_trip_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = GenerationStore::new(Arc::new(LocalBackend::new("local", temp_dir.path()).unwrap()));
        assert_eq!(store.pointer().await.unwrap(), None);
        store.set_pointer(&generation(4)).await.unwrap();
        let reopened = GenerationStore::new(Arc::new(LocalBackend::new("local", temp_dir.path()).unwrap()));
        assert_eq!(reopened.pointer().await.unwrap(), Some(generation(4)));
    }

    #[test]
    fn keys_depend_on_method_and_url_only() {
        let plain = request("https://scanner.example/app.js");
        let with_header = plain.clone().with_header("Accept", "*/*");
        assert_eq!(GenerationStore::key(&plain), GenerationStore::key(&with_header));
        assert_ne!(GenerationStore::key(&plain), GenerationStore::key(&request("https://scanner.example/app.css")));
        assert_eq!(GenerationStore::key(&plain).len(), 64);
    }
}
