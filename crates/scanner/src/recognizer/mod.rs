//! Text recognition seam.
//!
//! A [`Recognizer`] turns image bytes into raw, newline-delimited text. What
//! happens in between is opaque to the rest of the pipeline; the only
//! feedback it gives is a bounded stream of progress fractions.

#[cfg(any(test, feature = "mock"))]
mod mock;
mod tesseract;

#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockRecognizer;
pub use self::tesseract::{DEFAULT_LANGUAGE, Tesseract};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of the progress channel between a recogniser and the pipeline.
pub(crate) const PROGRESS_CAPACITY: usize = 16;

/// Sending half of a recogniser's progress stream.
///
/// Progress is advisory: when the receiver falls behind (or has gone away)
/// updates are dropped rather than stalling recognition.
#[derive(Debug, Clone)]
pub struct Progress {
    sender: mpsc::Sender<f32>,
}
impl Progress {
    pub(crate) fn new(sender: mpsc::Sender<f32>) -> Self {
        Self { sender }
    }

    /// A reporter nobody listens to.
    pub fn discard() -> Self {
        let (sender, _) = mpsc::channel(1);
        Self { sender }
    }

    /// Report completion as a fraction in `0.0..=1.0` (clamped).
    pub fn report(&self, fraction: f32) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        if self.sender.try_send(fraction).is_err() {
            tracing::trace!(fraction, "Dropped recognition progress update");
        }
    }
}

#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Name of the recogniser, used for logging only.
    fn name(&self) -> &str;

    /// Recognise the text in `image`.
    async fn recognize(&self, image: &[u8], progress: Progress) -> Result<String>;
}

pub type RecognizerHandle = Arc<dyn Recognizer + Send + Sync>;
