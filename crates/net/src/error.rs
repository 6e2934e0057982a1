//! Network Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A network error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for network operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// A response with a non-success status is **not** an error at this layer;
/// it's a [`Response`](crate::Response) the caller has to inspect.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response (DNS, refused connection, no
    /// network at all).
    #[display("network unreachable: {_0}")]
    Unreachable(#[error(not(source))] String),
    /// The transport gave up waiting for a response.
    #[display("request timed out: {_0}")]
    Timeout(#[error(not(source))] String),
    /// The URL could not be parsed or joined.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The response body could not be read or decoded.
    #[display("could not decode response body from {_0}")]
    Decode(#[error(not(source))] String),
    /// The HTTP client could not be constructed.
    #[display("could not build HTTP client")]
    Client,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Unreachable("offline".to_string()).is_retryable());
        assert!(ErrorKind::Timeout("slow".to_string()).is_retryable());
        assert!(!ErrorKind::Decode("https://example.com".to_string()).is_retryable());
        assert!(!ErrorKind::Client.is_retryable());
    }
}
