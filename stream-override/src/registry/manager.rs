//! FetchRegistry implementation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use stream_override_core::{
    ClientName, FetchError, FetchedStream, Raw, RequestContext, StreamFetcher, VideoId,
};
use tokio::runtime::Handle;
use tokio::sync::{Notify, OnceCell};
use tracing::{Instrument, debug, error, info_span, warn};

use super::policy::{FetchConfig, TimeoutPolicy};

#[cfg(feature = "metrics")]
use crate::metrics::{FETCHES_DEDUPLICATED, FETCHES_FAILED, FETCHES_STARTED, FETCH_DURATION};

#[derive(Debug)]
struct FetchState {
    id: VideoId,
    /// `Some(None)` once a fetch has finished without a payload.
    outcome: OnceCell<Option<FetchedStream>>,
    completed: Notify,
}

/// Handle to one fetch attempt for one identifier.
///
/// Cloning is cheap and every clone observes the same attempt. All reads
/// are non-blocking: before completion they report "not yet available".
#[derive(Debug, Clone)]
pub struct FetchHandle {
    inner: Arc<FetchState>,
}

impl FetchHandle {
    fn new(id: VideoId) -> Self {
        Self {
            inner: Arc::new(FetchState {
                id,
                outcome: OnceCell::new(),
                completed: Notify::new(),
            }),
        }
    }

    /// Identifier this fetch was started for.
    pub fn id(&self) -> &VideoId {
        &self.inner.id
    }

    /// Check if the fetch has finished, successfully or not.
    ///
    /// Once this returns `true`, [`bytes`](Self::bytes) returns the final result.
    pub fn is_complete(&self) -> bool {
        self.inner.outcome.initialized()
    }

    /// The fetched stream, if the fetch has completed successfully.
    pub fn stream(&self) -> Option<&FetchedStream> {
        self.inner.outcome.get().and_then(Option::as_ref)
    }

    /// Replacement payload, if the fetch has completed successfully.
    pub fn bytes(&self) -> Option<Raw> {
        self.stream().map(|stream| stream.payload.clone())
    }

    /// Client the payload was fetched as, if the fetch has completed successfully.
    pub fn client(&self) -> Option<&ClientName> {
        self.stream().map(|stream| &stream.client)
    }

    /// Wait until the fetch finishes and return its payload.
    ///
    /// Never used on the playback path. If the fetch task panics this
    /// future never resolves.
    pub async fn wait(&self) -> Option<Raw> {
        let completed = self.inner.completed.notified();
        if !self.is_complete() {
            completed.await;
        }
        self.bytes()
    }

    fn complete(&self, outcome: Option<FetchedStream>) {
        if self.inner.outcome.set(outcome).is_err() {
            warn!(video_id = %self.inner.id, "Fetch completed twice, keeping first result");
        }
        self.inner.completed.notify_waiters();
    }
}

/// Internal state shared across clones.
struct FetchRegistryInner {
    config: FetchConfig,
    fetcher: Arc<dyn StreamFetcher>,
    runtime: Handle,
    handles: DashMap<VideoId, FetchHandle>,
    last_client: Mutex<Option<ClientName>>,
}

impl std::fmt::Debug for FetchRegistryInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRegistryInner")
            .field("config", &self.config)
            .field("fetcher", &"...")
            .field("handles", &self.handles.len())
            .finish()
    }
}

/// Registry of fetch attempts, at most one per identifier per session.
///
/// Fetches run on the tokio runtime captured at construction, so
/// [`start_or_reuse`](Self::start_or_reuse) can be called from threads that
/// are not part of that runtime.
#[derive(Clone, Debug)]
pub struct FetchRegistry {
    inner: Arc<FetchRegistryInner>,
}

impl FetchRegistry {
    /// Create a registry spawning fetches on the given runtime.
    pub fn new<F>(fetcher: F, config: FetchConfig, runtime: Handle) -> Self
    where
        F: StreamFetcher + 'static,
    {
        Self {
            inner: Arc::new(FetchRegistryInner {
                config,
                fetcher: Arc::new(fetcher),
                runtime,
                handles: DashMap::new(),
                last_client: Mutex::new(None),
            }),
        }
    }

    /// Create a registry on the current runtime with default configuration.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn with_defaults<F>(fetcher: F) -> Self
    where
        F: StreamFetcher + 'static,
    {
        Self::new(fetcher, FetchConfig::default(), Handle::current())
    }

    /// Start a fetch for `id` unless one already exists.
    ///
    /// Returns `true` if a fetch was started, `false` if an existing handle
    /// was reused. `context` is handed to the fetcher unchanged.
    pub fn start_or_reuse(&self, id: VideoId, context: RequestContext) -> bool {
        // Dedup under a read lock so concurrent lookups are never held off
        if self.inner.handles.contains_key(&id) {
            self.record_deduplicated(&id);
            return false;
        }

        let handle = match self.inner.handles.entry(id) {
            Entry::Occupied(entry) => {
                self.record_deduplicated(entry.key());
                return false;
            }
            Entry::Vacant(entry) => {
                let handle = FetchHandle::new(entry.key().clone());
                entry.insert(handle.clone());
                handle
            }
        };

        #[cfg(feature = "metrics")]
        metrics::counter!(*FETCHES_STARTED).increment(1);

        self.spawn_fetch(handle, context);
        true
    }

    fn record_deduplicated(&self, id: &VideoId) {
        debug!(video_id = %id, "Fetch deduplicated - already started");
        #[cfg(feature = "metrics")]
        metrics::counter!(*FETCHES_DEDUPLICATED).increment(1);
    }

    /// Look up the handle for `id`.
    ///
    /// Takes a shard read lock. Writers only hold a shard for a single
    /// insert, so this never waits on a fetch.
    pub fn lookup(&self, id: &str) -> Option<FetchHandle> {
        self.inner.handles.get(id).map(|entry| entry.value().clone())
    }

    /// Check if a fetch for `id` has been started and not finished yet.
    pub fn is_in_flight(&self, id: &str) -> bool {
        self.lookup(id).is_some_and(|handle| !handle.is_complete())
    }

    /// Name of the client that served the most recent successful fetch.
    pub fn last_client_name(&self) -> Option<ClientName> {
        self.inner
            .last_client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of tracked handles, finished or not.
    pub fn len(&self) -> usize {
        self.inner.handles.len()
    }

    /// Returns `true` if no fetch has been started in this session.
    pub fn is_empty(&self) -> bool {
        self.inner.handles.is_empty()
    }

    /// End the session: forget all handles.
    ///
    /// Fetches still running complete into handles nobody can look up any more.
    pub fn clear(&self) {
        self.inner.handles.clear();
    }

    fn spawn_fetch(&self, handle: FetchHandle, context: RequestContext) {
        let inner = Arc::clone(&self.inner);
        let span = info_span!("stream_override.fetch", video_id = %handle.id());

        self.inner.runtime.spawn(
            async move {
                let start = Instant::now();
                let fetch = inner.fetcher.fetch(handle.id().clone(), context);
                let result = match inner.config.timeout_policy {
                    TimeoutPolicy::None => fetch.await,
                    TimeoutPolicy::Cancel(duration) => {
                        match tokio::time::timeout(duration, fetch).await {
                            Ok(result) => result,
                            Err(_) => Err(FetchError::Timeout),
                        }
                    }
                    TimeoutPolicy::Warn(duration) => {
                        let result = fetch.await;
                        let elapsed = start.elapsed();
                        if elapsed > duration {
                            warn!(
                                elapsed_ms = elapsed.as_millis(),
                                threshold_ms = duration.as_millis(),
                                "Fetch exceeded timeout threshold"
                            );
                        }
                        result
                    }
                };
                inner.finish(&handle, result, start);
            }
            .instrument(span),
        );
    }
}

impl FetchRegistryInner {
    fn finish(
        &self,
        handle: &FetchHandle,
        result: Result<FetchedStream, FetchError>,
        start: Instant,
    ) {
        #[cfg(feature = "metrics")]
        metrics::histogram!(*FETCH_DURATION).record(start.elapsed().as_secs_f64());

        match result {
            Ok(stream) => {
                debug!(
                    client = %stream.client,
                    bytes = stream.payload.len(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "Fetched replacement streaming data"
                );
                *self
                    .last_client
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(stream.client.clone());
                handle.complete(Some(stream));
            }
            Err(err) => {
                error!(
                    error = %err,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Fetch failed, keeping original streaming data"
                );
                #[cfg(feature = "metrics")]
                metrics::counter!(*FETCHES_FAILED).increment(1);
                handle.complete(None);
            }
        }
    }
}
