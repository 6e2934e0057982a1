//! Offline Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An offline cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for offline cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A manifest resource could not be fetched (or came back with a
    /// non-success status); the installation was abandoned and nothing from
    /// it is addressable.
    #[display("failed to install offline cache: could not fetch {_0}")]
    Install(#[error(not(source))] String),
    /// The generation store could not be read or written.
    #[display("offline cache storage failure")]
    Storage,
    /// A stored entry exists but can't be decoded.
    #[display("corrupt cache entry: {_0}")]
    CorruptEntry(#[error(not(source))] String),
    #[display("invalid cache generation tag: {_0:?}")]
    InvalidGeneration(#[error(not(source))] String),
    #[display("invalid manifest entry: {_0:?}")]
    InvalidManifest(#[error(not(source))] String),
    /// Another installation or activation is still running.
    #[display("offline cache is busy: {_0}")]
    Busy(#[error(not(source))] String),
    /// Activation was requested without a completed installation.
    #[display("no installed generation is waiting to be activated")]
    NothingToActivate,
    /// The requested generation is already the active one.
    #[display("generation {_0} is already active")]
    AlreadyActive(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Install(_) | Self::Storage | Self::Busy(_))
    }
}
