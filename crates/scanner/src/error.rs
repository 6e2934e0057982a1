//! Scanner Error Types
//!
//! The `Display` text of every [`ErrorKind`] is the message shown to the
//! user when an identification or search is abandoned.

use derive_more::{Display, Error};

/// A scanner error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scanner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the user should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The recogniser failed or produced nothing usable.
    #[display("Text recognition failed. Please try again with a sharper photo.")]
    Recognition,
    /// No text recogniser is available on this system.
    #[display("Text recognition is unavailable: tesseract was not found on your system.")]
    RecognizerNotFound,
    #[display("Could not recognise the card name. Try the manual search instead.")]
    NoMatch,
    #[display("No card found for \"{_0}\".")]
    NotFound(#[error(not(source))] String),
    #[display("Card search failed. Please check your connection and try again.")]
    Catalog,
    /// The catalog couldn't be reached and answered with an offline notice.
    #[display("{_0}")]
    Offline(#[error(not(source))] String),
    #[display("Please enter a card name to search for.")]
    EmptyQuery,
    /// Another scan or search is still running.
    #[display("A scan or search is already in progress.")]
    Busy,
}

impl ErrorKind {
    /// Convert a catalog error into a scanner error, keeping the catalog's
    /// `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn catalog(err: cardscan_catalog::error::Error, term: &str) -> Error {
        use cardscan_catalog::error::ErrorKind as Catalog;
        let kind = match &*err {
            Catalog::EmptyQuery => Self::EmptyQuery,
            Catalog::NotFound(_) => Self::NotFound(term.trim().to_string()),
            Catalog::Offline(message) => Self::Offline(message.clone()),
            Catalog::Unavailable => Self::Catalog,
        };
        err.raise(kind)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog | Self::Offline(_) | Self::Busy)
    }
}
