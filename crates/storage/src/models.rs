use std::path::PathBuf;
use time::OffsetDateTime;

/// Metadata for a single stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl BlobInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        Self { path: path.into(), size, modified }
    }

    /// First path component, i.e. the top-level directory the blob lives in.
    /// `None` for blobs stored directly under the root.
    pub fn top_level(&self) -> Option<&str> {
        let mut components = self.path.components();
        let first = components.next()?;
        components.next()?;
        first.as_os_str().to_str()
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.path.extension().is_some_and(|ext| ext == extension)
    }
}
