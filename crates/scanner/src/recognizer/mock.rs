//! Scripted recogniser for testing.

use super::{Progress, Recognizer};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Recogniser that "reads" a fixed text (or fails), reporting the given
/// progress fractions along the way.
pub struct MockRecognizer {
    text: Option<String>,
    steps: Vec<f32>,
    calls: AtomicUsize,
}
impl MockRecognizer {
    pub fn reading(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), steps: vec![0.0, 0.5, 1.0], calls: AtomicUsize::new(0) }
    }

    /// A recogniser that always fails.
    pub fn failing() -> Self {
        Self { text: None, steps: vec![0.0], calls: AtomicUsize::new(0) }
    }

    pub fn with_steps(mut self, steps: impl IntoIterator<Item = f32>) -> Self {
        self.steps = steps.into_iter().collect();
        self
    }

    /// How many times [`recognize`](Recognizer::recognize) was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(&self, _image: &[u8], progress: Progress) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for step in &self.steps {
            progress.report(*step);
            tokio::task::yield_now().await;
        }
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => exn::bail!(ErrorKind::Recognition),
        }
    }
}
