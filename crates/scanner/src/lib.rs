//! Card identification.
//!
//! A [`Scanner`] runs a photographed card through text recognition, name
//! resolution and the catalog, in that order; a [`Session`] makes sure only
//! one such action runs at a time.

pub mod error;
mod pipeline;
pub mod recognizer;
mod session;

pub use crate::pipeline::{Identification, ScanEvent, ScanStream, Scanner, Stage};
pub use crate::recognizer::{Progress, Recognizer, RecognizerHandle, Tesseract};
pub use crate::session::Session;
