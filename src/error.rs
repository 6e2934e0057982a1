//! CLI Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A lower layer already phrased the problem for the user.
    #[display("{_0}")]
    Failed(#[error(not(source))] String),
    #[display("invalid configuration: {_0}")]
    Config(#[error(not(source))] String),
    #[display("could not read {}", _0.display())]
    Input(#[error(not(source))] PathBuf),
    #[display("could not read standard input")]
    Stdin,
    #[display("could not write to standard output")]
    Output,
    #[display("offline cache: {_0}")]
    Cache(#[error(not(source))] String),
    #[display("could not set up the network client")]
    Network,
}

impl ErrorKind {
    /// Re-raise `err`, showing the user its own message.
    #[track_caller]
    pub fn failed<E>(err: exn::Exn<E>) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = (*err).to_string();
        err.raise(Self::Failed(message))
    }

    #[track_caller]
    pub fn config<E>(err: exn::Exn<E>) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = (*err).to_string();
        err.raise(Self::Config(message))
    }

    #[track_caller]
    pub fn cache<E>(err: exn::Exn<E>) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = (*err).to_string();
        err.raise(Self::Cache(message))
    }
}
