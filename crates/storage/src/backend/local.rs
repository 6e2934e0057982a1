//! Local filesystem storage backend.
//!
//! Blobs are plain files under a configured root directory, accessed via
//! `tokio::fs`. Writes go through a sibling `.partial` file and a rename so
//! a crash mid-write never leaves a truncated blob behind.

use crate::backend::BlobInfoStream;
use crate::error::ErrorKind;
use crate::{BlobInfo, StorageBackend, error::Result, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::ffi::OsString;
use std::fs::{Metadata, create_dir_all as sync_create_dir};
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

const PARTIAL_EXTENSION: &str = "partial";

enum WalkEntry {
    Blob(BlobInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use cardscan_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("offline", "/home/me/.cache/cardscan")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend rooted at `root`, creating the
    /// directory if it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if the path is not
    /// absolute or points at something other than a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Only happens once at startup; not worth an async constructor.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{:?}` is not within root `{:?}`", absolute, self.root))
        })?;
        validate_path(relative)
    }

    fn partial_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".");
        name.push(PARTIAL_EXTENSION);
        path.with_file_name(name)
    }

    fn metadata(path: &Path, metadata: Metadata) -> Result<BlobInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        Ok(BlobInfo::new(path, metadata.len(), modified))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Errors can't be `?`-ed inside the walk stream, so each entry is
    /// classified here and the stream only has to yield the result.
    async fn process_entry(&self, entry: DirEntry, prefix: Option<&Path>) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        let relative = self.relative_path(&path)?;
        if let Some(pfx) = prefix
            && !relative.starts_with(pfx)
        {
            return Ok(WalkEntry::Skip);
        }
        if metadata.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if metadata.is_file() && relative.extension().is_none_or(|ext| ext != PARTIAL_EXTENSION) {
            return Ok(WalkEntry::Blob(Self::metadata(&relative, metadata)?));
        }
        // Unfinished writes and broken symlinks.
        Ok(WalkEntry::Skip)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> BlobInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Result::Err(e) })),
        };

        // Walk from the parent of the prefix so a prefix naming a single
        // blob (or a directory that doesn't exist yet) still works.
        let start_dir = validated_prefix
            .as_ref()
            .map(|prefix| self.root.join(prefix).parent().unwrap_or(&self.root).to_path_buf())
            .unwrap_or_else(|| self.root.clone());
        let mut stack = vec![start_dir];

        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue 'dirs;
                    }
                };

                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(e) => { yield Err(exn::Exn::from(Self::map_io_error(e, &current))); continue 'entries; },
                    };
                    match self.process_entry(entry, validated_prefix.as_deref()).await {
                        Ok(WalkEntry::Blob(info)) => yield Ok(info),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        let partial = Self::partial_path(&abs_path);
        fs::write(&partial, data).await.map_err(|e| Self::map_io_error(e, path))?;
        if let Err(e) = fs::rename(&partial, &abs_path).await {
            let _ = fs::remove_file(&partial).await;
            exn::bail!(Self::map_io_error(e, path));
        }
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::remove_file(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn delete_prefix(&self, prefix: &Path) -> Result<usize> {
        let abs_path = self.absolute_path(prefix)?;
        if !fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)? {
            return Ok(0);
        }
        if !fs::metadata(&abs_path).await.map_err(|e| Self::map_io_error(e, prefix))?.is_dir() {
            fs::remove_file(&abs_path).await.map_err(|e| Self::map_io_error(e, prefix))?;
            return Ok(1);
        }
        let removed = self.list(Some(prefix)).await?.len();
        match fs::remove_dir_all(&abs_path).await {
            Ok(()) => {},
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => exn::bail!(Self::map_io_error(e, prefix)),
        }
        tracing::debug!(backend = %self.name, prefix = %prefix.display(), removed, "Removed directory");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, LocalBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("local", temp_dir.path()).unwrap();
        (temp_dir, backend)
    }

    #[test]
    fn requires_absolute_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("local", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("local", "relative/path").is_err());
        assert!(LocalBackend::new("local", "./relative").is_err());
    }

    #[test]
    fn creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("nested/cache");
        LocalBackend::new("local", &root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn path_mapping_stays_within_root() {
        let (temp_dir, backend) = backend();
        let expected = temp_dir.path().join("cardscan-v1/4f2a.body");
        assert_eq!(backend.absolute_path("cardscan-v1/4f2a.body").unwrap(), expected);
        assert_eq!(backend.relative_path(&expected).unwrap(), Path::new("cardscan-v1/4f2a.body"));
        assert!(backend.absolute_path("../etc/passwd").is_err());
        assert!(backend.relative_path("/other/file").is_err());
    }

    #[tokio::test]
    async fn write_read_and_overwrite() {
        let (_dir, backend) = backend();
        let path = Path::new("cardscan-v1/4f2a.body");
        backend.write(path, b"first").await.unwrap();
        assert_eq!(backend.read(path).await.unwrap(), b"first");
        backend.write(path, b"second").await.unwrap();
        assert_eq!(backend.read(path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn writes_leave_no_partial_files() {
        let (temp_dir, backend) = backend();
        backend.write(Path::new("cardscan-v1/4f2a.body"), b"data").await.unwrap();
        assert!(!temp_dir.path().join("cardscan-v1/4f2a.body.partial").exists());
    }

    #[tokio::test]
    async fn partial_files_are_not_listed() {
        let (temp_dir, backend) = backend();
        backend.write(Path::new("cardscan-v1/4f2a.body"), b"data").await.unwrap();
        std::fs::write(temp_dir.path().join("cardscan-v1/9e1c.body.partial"), b"half").unwrap();
        let blobs = backend.list(None).await.unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].path, Path::new("cardscan-v1/4f2a.body"));
    }

    #[tokio::test]
    async fn read_optional_maps_absence() {
        let (_dir, backend) = backend();
        assert_eq!(backend.read_optional(Path::new("_active")).await.unwrap(), None);
        backend.write(Path::new("_active"), b"cardscan-v1").await.unwrap();
        assert_eq!(backend.read_optional(Path::new("_active")).await.unwrap(), Some(b"cardscan-v1".to_vec()));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (_dir, backend) = backend();
        backend.write(Path::new("a.meta"), b"data").await.unwrap();
        backend.delete(Path::new("a.meta")).await.unwrap();
        assert_eq!(backend.read_optional(Path::new("a.meta")).await.unwrap(), None);
        let err = backend.delete(Path::new("a.meta")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn list_prefix_is_component_based() {
        let (_dir, backend) = backend();
        backend.write(Path::new("cardscan-v1/a.meta"), b"1").await.unwrap();
        backend.write(Path::new("cardscan-v1/a.body"), b"1").await.unwrap();
        backend.write(Path::new("cardscan-v10/b.meta"), b"2").await.unwrap();
        backend.write(Path::new("_active"), b"cardscan-v1").await.unwrap();
        assert_eq!(backend.list(None).await.unwrap().len(), 4);
        let v1 = backend.list(Some(Path::new("cardscan-v1"))).await.unwrap();
        assert_eq!(v1.len(), 2);
        assert!(v1.iter().all(|info| info.path.starts_with("cardscan-v1")));
        assert!(backend.list(Some(Path::new("cardscan-v7"))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_prefix_removes_generation_directory() {
        let (temp_dir, backend) = backend();
        backend.write(Path::new("cardscan-v1/a.meta"), b"1").await.unwrap();
        backend.write(Path::new("cardscan-v1/a.body"), b"1").await.unwrap();
        backend.write(Path::new("cardscan-v2/b.meta"), b"2").await.unwrap();
        assert_eq!(backend.delete_prefix(Path::new("cardscan-v1")).await.unwrap(), 2);
        assert!(!temp_dir.path().join("cardscan-v1").exists());
        assert_eq!(backend.list(None).await.unwrap().len(), 1);
        assert_eq!(backend.delete_prefix(Path::new("cardscan-v1")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn listing_reports_size() {
        let (_dir, backend) = backend();
        backend.write(Path::new("cardscan-v1/a.body"), b"Hello, world!").await.unwrap();
        let listed = backend.list(Some(Path::new("cardscan-v1"))).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, PathBuf::from("cardscan-v1/a.body"));
        assert_eq!(listed[0].size, 13);
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_dir, backend) = backend();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("../etc/passwd"), b"data").await.is_err());
        assert!(backend.delete(Path::new("../../file")).await.is_err());
        assert!(backend.delete_prefix(Path::new("..")).await.is_err());
    }
}
