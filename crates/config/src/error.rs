//! Configuration Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration source could not be parsed into settings.
    #[display("configuration could not be loaded")]
    Extract,
    /// A value parsed, but makes no sense.
    #[display("invalid configuration value for `{_0}`")]
    Invalid(#[error(not(source))] String),
    /// An explicitly requested configuration file doesn't exist.
    #[display("configuration file not found: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// Configuration file extension isn't one of toml, yaml, yml or json.
    #[display("unsupported configuration format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// No platform directory could be determined for the given purpose.
    #[display("could not determine the {_0} directory; set it explicitly")]
    NoDirectory(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
