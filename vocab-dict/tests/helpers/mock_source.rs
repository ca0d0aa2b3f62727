//! Scripted `DictionarySource` implementations

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vocab_dict::models::{CanonicalRecord, SourceId};
use vocab_dict::sources::{ConnectorError, DictionarySource, FetchResult};

#[derive(Debug, Clone)]
pub enum MockBehavior {
    Found(CanonicalRecord),
    NotFound,
    Fail,
    /// Never completes on its own
    Hang,
}

/// Tracks how many fetches are in flight at once
#[derive(Debug, Default)]
pub struct ConcurrencyTracker {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyTracker {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(self: &Arc<Self>) -> InFlight {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlight(Arc::clone(self))
    }
}

struct InFlight(Arc<ConcurrencyTracker>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct MockSource {
    id: SourceId,
    behavior: MockBehavior,
    delay: Duration,
    tracker: Option<Arc<ConcurrencyTracker>>,
    calls: AtomicUsize,
    saw_cancel: Arc<AtomicBool>,
}

impl MockSource {
    pub fn new(id: SourceId, behavior: MockBehavior) -> Self {
        Self {
            id,
            behavior,
            delay: Duration::ZERO,
            tracker: None,
            calls: AtomicUsize::new(0),
            saw_cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn found(record: CanonicalRecord) -> Self {
        Self::new(record.source, MockBehavior::Found(record))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<ConcurrencyTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Set once the fetch's cancellation token fires
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.saw_cancel)
    }
}

#[async_trait]
impl DictionarySource for MockSource {
    fn source_id(&self) -> SourceId {
        self.id
    }

    async fn fetch(&self, _word: &str, cancel: &CancellationToken) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = self.tracker.as_ref().map(|t| t.enter());

        // Outlives this future so cancellation is observable after it is dropped
        let token = cancel.clone();
        let flag = Arc::clone(&self.saw_cancel);
        tokio::spawn(async move {
            token.cancelled().await;
            flag.store(true, Ordering::SeqCst);
        });

        let work = async {
            tokio::time::sleep(self.delay).await;
            match &self.behavior {
                MockBehavior::Found(record) => Ok(Some(record.clone())),
                MockBehavior::NotFound => Ok(None),
                MockBehavior::Fail => Err(ConnectorError::Network("connection refused".to_string())),
                MockBehavior::Hang => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(ConnectorError::Cancelled),
            result = work => result,
        }
    }
}

/// Record with the given phonetic and example text
pub fn record(source: SourceId, phonetic: &str, example: &str) -> CanonicalRecord {
    CanonicalRecord::new(source, "big")
        .with_phonetic(phonetic)
        .with_meaning(format!("{} meaning", source))
        .with_example(example)
}
