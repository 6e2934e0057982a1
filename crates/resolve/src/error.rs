//! Resolution Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A resolution error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Every resolution tier was exhausted without producing a name.
    #[display("no card name could be resolved from the recognised text")]
    NoMatch,
    /// A known-name list could not be parsed.
    #[display("invalid known-name list: {_0}")]
    InvalidNameList(#[error(not(source))] String),
    /// A known-name list file could not be read.
    #[display("could not read known-name list: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Resolution is deterministic: the same text always resolves the same
        // way. A new capture is a different input, not a retry.
        false
    }
}
