use crate::error::{ErrorKind, Result};
use crate::pipeline::{Identification, ScanStream, Scanner};
use async_stream::stream;
use cardscan_catalog::CatalogRecord;
use futures::StreamExt;
use tokio::sync::{Mutex, MutexGuard};

/// Single-flight wrapper around a [`Scanner`].
///
/// At most one scan or search runs at a time; starting another while one is
/// in flight fails immediately with [`Busy`](ErrorKind::Busy) instead of
/// queueing behind it.
pub struct Session {
    scanner: Scanner,
    flight: Mutex<()>,
}
impl Session {
    pub fn new(scanner: Scanner) -> Self {
        Self { scanner, flight: Mutex::new(()) }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn is_busy(&self) -> bool {
        self.flight.try_lock().is_err()
    }

    fn begin(&self) -> Result<MutexGuard<'_, ()>> {
        match self.flight.try_lock() {
            Ok(guard) => Ok(guard),
            Err(_) => exn::bail!(ErrorKind::Busy),
        }
    }

    /// Start a scan. The session stays busy until the returned stream is
    /// exhausted or dropped.
    pub fn scan(&self, image: Vec<u8>) -> Result<ScanStream<'_>> {
        let flight = self.begin()?;
        let mut events = self.scanner.scan(image);
        Ok(Box::pin(stream! {
            let _flight = flight;
            while let Some(event) = events.next().await {
                yield event;
            }
        }))
    }

    pub async fn identify(&self, image: Vec<u8>) -> Result<Identification> {
        let _flight = self.begin()?;
        self.scanner.identify(image).await
    }

    pub async fn search(&self, term: &str, limit: u32) -> Result<Vec<CatalogRecord>> {
        let _flight = self.begin()?;
        self.scanner.search(term, limit).await
    }
}
