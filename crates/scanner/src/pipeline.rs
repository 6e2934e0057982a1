//! Card identification pipeline.
//!
//! ```text
//! image ──recognize──▶ raw text ──resolve──▶ candidate ──search_best──▶ record
//!   10%      20..50%                 50%                  70%  90%        100%
//! ```

use crate::error::{ErrorKind, Result};
use crate::recognizer::{PROGRESS_CAPACITY, Progress, RecognizerHandle};
use async_stream::stream;
use cardscan_catalog::{CatalogClient, CatalogRecord};
use cardscan_resolve::Resolver;
use cardscan_resolve::models::Candidate;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;

pub type ScanStream<'a> = Pin<Box<dyn Stream<Item = Result<ScanEvent>> + Send + 'a>>;

/// Where the pipeline currently is, with the progress shown on entering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Preparing,
    Reading,
    Analysing,
    Searching,
    LoadingPrices,
    Done,
}
impl Stage {
    pub fn percent(&self) -> u8 {
        match self {
            Self::Preparing => 10,
            Self::Reading => 20,
            Self::Analysing => 50,
            Self::Searching => 70,
            Self::LoadingPrices => 90,
            Self::Done => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Preparing => "Preparing image",
            Self::Reading => "Reading text",
            Self::Analysing => "Analysing text",
            Self::Searching => "Searching for card",
            Self::LoadingPrices => "Loading prices",
            Self::Done => "Done",
        }
    }

    /// Map recogniser progress (`0.0..=1.0`) onto the reading band.
    pub fn reading_percent(fraction: f32) -> u8 {
        let span = f32::from(Self::Analysing.percent() - Self::Reading.percent());
        let offset = (fraction.clamp(0.0, 1.0) * span).round() as u8;
        Self::Reading.percent() + offset
    }
}
impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Progress { stage: Stage, percent: u8 },
    Recognized(String),
    Resolved(Candidate),
    Found(Box<CatalogRecord>),
}
impl ScanEvent {
    fn entering(stage: Stage) -> Self {
        Self::Progress { stage, percent: stage.percent() }
    }
}

/// Outcome of a complete, successful identification.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    pub text: String,
    pub candidate: Candidate,
    pub record: CatalogRecord,
}

/// Recognition, name resolution and catalog lookup wired together.
///
/// Every failure ends the run: nothing is retried and no later stage runs.
#[derive(Clone)]
pub struct Scanner {
    recognizer: RecognizerHandle,
    resolver: Arc<Resolver>,
    catalog: CatalogClient,
}
impl Scanner {
    pub fn new(recognizer: RecognizerHandle, resolver: Arc<Resolver>, catalog: CatalogClient) -> Self {
        Self { recognizer, resolver, catalog }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// Run the pipeline over `image`, reporting each step as it happens.
    ///
    /// The stream ends after the first `Err`, or after the
    /// [`Done`](Stage::Done) progress event.
    pub fn scan(&self, image: Vec<u8>) -> ScanStream<'_> {
        Box::pin(stream! {
            yield Ok(ScanEvent::entering(Stage::Preparing));
            yield Ok(ScanEvent::entering(Stage::Reading));

            let (sender, mut receiver) = mpsc::channel(PROGRESS_CAPACITY);
            let recognition = self.recognizer.recognize(&image, Progress::new(sender));
            tokio::pin!(recognition);
            let text = loop {
                let fraction = tokio::select! {
                    biased;
                    Some(fraction) = receiver.recv() => fraction,
                    text = &mut recognition => break text,
                };
                yield Ok(ScanEvent::Progress { stage: Stage::Reading, percent: Stage::reading_percent(fraction) });
            };
            while let Ok(fraction) = receiver.try_recv() {
                yield Ok(ScanEvent::Progress { stage: Stage::Reading, percent: Stage::reading_percent(fraction) });
            }
            let text = match text {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(recognizer = self.recognizer.name(), error = ?e, "Text recognition failed");
                    yield Err(e.raise(ErrorKind::Recognition));
                    return;
                },
            };
            tracing::debug!(characters = text.len(), "Recognised text");
            yield Ok(ScanEvent::Recognized(text.clone()));

            yield Ok(ScanEvent::entering(Stage::Analysing));
            let candidate = match self.resolver.resolve(&text).or_raise(|| ErrorKind::NoMatch) {
                Ok(candidate) => candidate,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            tracing::debug!(name = candidate.name(), provenance = %candidate.provenance(), "Resolved card name");
            yield Ok(ScanEvent::Resolved(candidate.clone()));

            yield Ok(ScanEvent::entering(Stage::Searching));
            let record = match self.catalog.search_best(candidate.name()).await {
                Ok(record) => record,
                Err(e) => {
                    yield Err(ErrorKind::catalog(e, candidate.name()));
                    return;
                },
            };
            yield Ok(ScanEvent::entering(Stage::LoadingPrices));
            yield Ok(ScanEvent::Found(Box::new(record)));
            yield Ok(ScanEvent::entering(Stage::Done));
        })
    }

    /// Run the pipeline to completion, discarding progress.
    #[tracing::instrument(skip_all, fields(bytes = image.len()))]
    pub async fn identify(&self, image: Vec<u8>) -> Result<Identification> {
        let mut events = self.scan(image);
        let (mut text, mut candidate) = (None, None);
        while let Some(event) = events.next().await {
            match event? {
                ScanEvent::Recognized(recognized) => text = Some(recognized),
                ScanEvent::Resolved(resolved) => candidate = Some(resolved),
                ScanEvent::Found(record) => {
                    if let (Some(text), Some(candidate)) = (text.take(), candidate.take()) {
                        return Ok(Identification { text, candidate, record: *record });
                    }
                },
                ScanEvent::Progress { .. } => {},
            }
        }
        // The stream always reports every stage before a record.
        exn::bail!(ErrorKind::Recognition);
    }

    /// Manual search: up to `limit` records for `term`.
    ///
    /// An empty result is reported as [`NotFound`](ErrorKind::NotFound) so
    /// callers have a message to show.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, term: &str, limit: u32) -> Result<Vec<CatalogRecord>> {
        let records = self.catalog.search(term, limit).await.map_err(|e| ErrorKind::catalog(e, term))?;
        if records.is_empty() {
            exn::bail!(ErrorKind::NotFound(term.trim().to_string()));
        }
        Ok(records)
    }
}
