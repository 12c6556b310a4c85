//! Scripted fetchers for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use stream_override_core::{FetchError, FetchedStream, RequestContext, StreamFetcher, VideoId};
use tokio::sync::watch;

#[derive(Debug, Clone)]
enum Outcome {
    Stream(FetchedStream),
    Failure(String),
}

type Gate = watch::Sender<Option<Outcome>>;

#[derive(Debug, Default)]
struct MockFetcherInner {
    calls: DashMap<VideoId, usize>,
    gates: DashMap<VideoId, Gate>,
    contexts: Mutex<Vec<(VideoId, RequestContext)>>,
}

/// Fetcher whose fetches stay pending until the test completes them.
///
/// Completing an identifier before its fetch starts is allowed; the fetch
/// then finishes as soon as it runs.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    inner: Arc<MockFetcherInner>,
}

impl MockFetcher {
    /// Create a fetcher with no scripted outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self, id: &str) -> watch::Receiver<Option<Outcome>> {
        self.inner
            .gates
            .entry(VideoId::new(id))
            .or_insert_with(|| watch::channel(None).0)
            .subscribe()
    }

    fn resolve(&self, id: &str, outcome: Outcome) {
        self.inner
            .gates
            .entry(VideoId::new(id))
            .or_insert_with(|| watch::channel(None).0)
            .send_replace(Some(outcome));
    }

    /// Complete the fetch for `id` with `payload` fetched as `client`.
    pub fn complete(&self, id: &str, payload: impl Into<Bytes>, client: &str) {
        self.resolve(id, Outcome::Stream(FetchedStream::new(payload, client)));
    }

    /// Fail the fetch for `id`.
    pub fn fail(&self, id: &str, message: &str) {
        self.resolve(id, Outcome::Failure(message.to_owned()));
    }

    /// Number of fetches started for `id`.
    pub fn calls(&self, id: &str) -> usize {
        self.inner.calls.get(id).map(|calls| *calls).unwrap_or(0)
    }

    /// Number of fetches started for all identifiers.
    pub fn total_calls(&self) -> usize {
        self.inner.calls.iter().map(|entry| *entry.value()).sum()
    }

    /// Request contexts received, in call order.
    pub fn contexts(&self) -> Vec<(VideoId, RequestContext)> {
        self.inner.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamFetcher for MockFetcher {
    async fn fetch(
        &self,
        id: VideoId,
        context: RequestContext,
    ) -> Result<FetchedStream, FetchError> {
        *self.inner.calls.entry(id.clone()).or_insert(0) += 1;
        self.inner
            .contexts
            .lock()
            .unwrap()
            .push((id.clone(), context));

        let mut gate = self.gate(id.as_str());
        let outcome = gate
            .wait_for(Option::is_some)
            .await
            .map_err(|err| FetchError::Connection(Box::new(err)))?
            .clone();

        match outcome {
            Some(Outcome::Stream(stream)) => Ok(stream),
            Some(Outcome::Failure(message)) => Err(FetchError::Malformed(message)),
            None => Err(FetchError::Malformed("gate opened without outcome".to_owned())),
        }
    }
}

/// Fetcher that counts calls and answers immediately with a fixed payload.
#[derive(Debug, Clone)]
pub struct CountingFetcher {
    calls: Arc<AtomicUsize>,
    payload: Bytes,
}

impl CountingFetcher {
    /// Create a fetcher answering with `payload`.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            payload: payload.into(),
        }
    }

    /// Number of fetches performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamFetcher for CountingFetcher {
    async fn fetch(
        &self,
        _id: VideoId,
        _context: RequestContext,
    ) -> Result<FetchedStream, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedStream::new(self.payload.clone(), "ANDROID_VR"))
    }
}
