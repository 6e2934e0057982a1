//! Catalog Error Types

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The search term was empty after trimming. Nothing was sent.
    #[display("search term is empty")]
    EmptyQuery,
    /// Transport failure, unexpected status, or an undecodable payload.
    /// Never falls through to the next query tier.
    #[display("card catalog unavailable")]
    Unavailable,
    /// Neither the exact nor the wildcard query matched anything.
    #[display("no card found for {_0:?}")]
    NotFound(#[error(not(source))] String),
    /// The catalog answered with an error payload instead of records; this
    /// is what the offline cache synthesizes when the catalog host can't be
    /// reached.
    #[display("card catalog reported: {_0}")]
    Offline(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable | Self::Offline(_))
    }
}
