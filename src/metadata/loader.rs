use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::source::Source;

use super::extract::{MetadataError, extract};
use super::model::TrackMetadata;

pub type ExtractFn = dyn Fn(&Source) -> Result<TrackMetadata, MetadataError> + Send + Sync;

/// What happened to one finished extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Result belongs to the newest request and is now current.
    Committed,
    /// Newest request failed; metadata stays absent.
    Failed,
    /// Result belongs to a superseded request and was dropped.
    Stale,
}

struct Completed {
    generation: u64,
    source: Source,
    result: Result<TrackMetadata, MetadataError>,
}

/// Runs extractions off the UI thread and keeps only the newest result.
///
/// Every `request` bumps `generation`; a completion is committed only when
/// it carries the generation of the latest request, regardless of the order
/// in which background threads finish.
pub struct MetadataLoader {
    extract: Arc<ExtractFn>,
    generation: u64,
    tx: Sender<Completed>,
    rx: Receiver<Completed>,
    current: Option<Arc<TrackMetadata>>,
    last_error: Option<String>,
}

impl Default for MetadataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataLoader {
    pub fn new() -> Self {
        Self::with_extractor(Arc::new(extract))
    }

    pub fn with_extractor(extract: Arc<ExtractFn>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            extract,
            generation: 0,
            tx,
            rx,
            current: None,
            last_error: None,
        }
    }

    /// Start extracting `source`. Clears the current snapshot immediately.
    pub fn request(&mut self, source: &Source) -> u64 {
        self.generation += 1;
        self.current = None;
        self.last_error = None;

        let generation = self.generation;
        let source = source.clone();
        let extract = Arc::clone(&self.extract);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = extract(&source);
            // The loader may be gone by now; nobody is left to care.
            let _ = tx.send(Completed {
                generation,
                source,
                result,
            });
        });

        tracing::debug!(generation, "metadata extraction started");
        generation
    }

    /// Apply every finished extraction. Returns true if the snapshot changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.rx.try_recv() {
            changed |= self.settle(done) != Outcome::Stale;
        }
        changed
    }

    /// Block until one extraction finishes and apply it.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Outcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(done) => Some(self.settle(done)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    fn settle(&mut self, done: Completed) -> Outcome {
        if done.generation != self.generation {
            tracing::debug!(
                stale = done.generation,
                current = self.generation,
                source = %done.source,
                "discarding superseded metadata"
            );
            return Outcome::Stale;
        }

        match done.result {
            Ok(meta) => {
                tracing::info!(source = %done.source, title = ?meta.title, "metadata loaded");
                self.current = Some(Arc::new(meta));
                Outcome::Committed
            }
            Err(e) => {
                tracing::warn!(source = %done.source, error = %e, "metadata extraction failed");
                self.current = None;
                self.last_error = Some(e.to_string());
                Outcome::Failed
            }
        }
    }

    pub fn current(&self) -> Option<&TrackMetadata> {
        self.current.as_deref()
    }

    /// Shared handle to the current snapshot.
    pub fn snapshot(&self) -> Option<Arc<TrackMetadata>> {
        self.current.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
