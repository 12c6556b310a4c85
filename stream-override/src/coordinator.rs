//! The override coordinator and its injection points.
//!
//! Each public method of [`OverrideCoordinator`] is called from one hook in
//! the player's playback pipeline. All of them share one contract: they never
//! fail and never block. Errors are logged and turned into the value that
//! leaves the player's behaviour unchanged.

use std::sync::Arc;

use bytes::Bytes;
use http::Uri;
use stream_override_core::{
    ClientName, ClientType, DurationMs, FeatureFlags, IdentifierParser, LatencyMarkedThreads,
    QueryIdParser, RequestContext, StreamFetcher, ThreadProbe, UNSET_DURATION, VideoId, is_unset,
};
use tokio::runtime::Handle;
use tracing::{debug, error, trace, warn};

use crate::cache::DurationFallbackCache;
use crate::config::OverrideConfig;
use crate::error::OverrideError;
use crate::metrics::{record_operation_error, record_override_read};
use crate::registry::FetchRegistry;

#[cfg(feature = "metrics")]
use crate::metrics::{BODIES_SUPPRESSED, PREMATURE_READS};

/// Request method code of a POST in the player's network stack.
pub const METHOD_POST: i32 = 2;

/// Path fragment of playback requests whose bodies are suppressed.
const PLAYBACK_PATH_MARKER: &str = "videoplayback";

/// Forces left-to-right layout, matching the time/length labels of the player.
const LEFT_TO_RIGHT_OVERRIDE: char = '\u{202D}';

const THIN_SPACE: char = '\u{2009}';

/// Callback fired when an incomplete fetch is read on a latency-sensitive thread.
pub type PrematureReadHook = Arc<dyn Fn(&VideoId) + Send + Sync>;

struct CoordinatorInner {
    flags: Arc<dyn FeatureFlags>,
    parser: Arc<dyn IdentifierParser>,
    probe: Arc<dyn ThreadProbe>,
    registry: FetchRegistry,
    durations: DurationFallbackCache,
    on_premature_read: Option<PrematureReadHook>,
}

/// Coordinates replacement streaming data for the playback pipeline.
///
/// Owns one [`FetchRegistry`] and one [`DurationFallbackCache`]; create one
/// coordinator per player instead of sharing process-wide state. Cloning is
/// cheap and all clones share state.
///
/// Every operation is gated by [`FeatureFlags::override_enabled`]. When the
/// master switch is off, each returns its pass-through value without touching
/// any state.
#[derive(Clone)]
pub struct OverrideCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl std::fmt::Debug for OverrideCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideCoordinator")
            .field("enabled", &self.inner.flags.override_enabled())
            .field("registry", &self.inner.registry)
            .field("durations", &self.inner.durations)
            .finish()
    }
}

impl OverrideCoordinator {
    /// Creates a new [`OverrideCoordinatorBuilder`].
    pub fn builder() -> OverrideCoordinatorBuilder<NotSet> {
        OverrideCoordinatorBuilder::new()
    }

    /// Runs `operation` under the "log and degrade" policy.
    ///
    /// Returns `fallback` when the master switch is off or the operation fails.
    fn guarded<T>(
        &self,
        name: &'static str,
        fallback: T,
        operation: impl FnOnce(&CoordinatorInner) -> Result<T, OverrideError>,
    ) -> T {
        if !self.inner.flags.override_enabled() {
            return fallback;
        }
        match operation(&self.inner) {
            Ok(value) => value,
            Err(err) => {
                error!(operation = name, error = %err, "Operation failed, passing through");
                record_operation_error(name);
                fallback
            }
        }
    }

    /// Injection point: a player request is about to be sent.
    ///
    /// Starts the replacement fetch for the identifier in `url`, unless one is
    /// already running or finished. `headers` are handed to the fetcher
    /// unchanged. Returns immediately.
    pub fn initiate(&self, url: &str, headers: RequestContext) {
        self.guarded("initiate", (), |inner| {
            match inner.parser.parse_identifier(url) {
                None => warn!(%url, "Ignoring request with no id"),
                Some(id) => match VideoId::parse(&id) {
                    None => trace!(%url, "Ignoring request with blank id"),
                    Some(id) => {
                        inner.registry.start_or_reuse(id, headers);
                    }
                },
            }
            Ok(())
        })
    }

    /// Injection point: the player wants streaming data for `id`.
    ///
    /// Returns the replacement payload if its fetch has completed, `None`
    /// otherwise. Never waits for a fetch.
    pub fn fetch_override_bytes(&self, id: &str) -> Option<Bytes> {
        self.guarded("fetch_override_bytes", None, |inner| {
            let Some(handle) = inner.registry.lookup(id) else {
                debug!(video_id = %id, "Not overriding streaming data (no fetch started)");
                record_override_read(false);
                return Ok(None);
            };

            if !handle.is_complete()
                && inner.flags.diagnostic_logging_enabled()
                && inner.probe.is_latency_sensitive()
            {
                warn!(
                    video_id = %id,
                    "Fetch not completed when read from a latency-sensitive thread"
                );
                #[cfg(feature = "metrics")]
                metrics::counter!(*PREMATURE_READS).increment(1);
                if let Some(hook) = &inner.on_premature_read {
                    hook(handle.id());
                }
            }

            match handle.stream() {
                Some(stream) if stream.payload.is_empty() => Err(OverrideError::UnexpectedState(
                    format!("empty payload fetched for {id}"),
                )),
                Some(stream) => {
                    debug!(video_id = %id, client = %stream.client, "Overriding video stream");
                    record_override_read(true);
                    Ok(Some(stream.payload.clone()))
                }
                None => {
                    debug!(video_id = %id, "Not overriding streaming data (video stream is null)");
                    record_override_read(false);
                    Ok(None)
                }
            }
        })
    }

    /// Injection point: the original data carried a duration for `id`.
    ///
    /// Keeps it as a fallback for when the replacement data has none.
    pub fn record_fallback_duration(&self, id: &str, duration_ms: DurationMs) {
        self.guarded("record_fallback_duration", (), |inner| {
            if is_unset(duration_ms) {
                return Ok(());
            }
            let Some(id) = VideoId::parse(id) else {
                trace!("Ignoring fallback duration without id");
                return Ok(());
            };
            debug!(video_id = %id, duration_ms, "New fallback duration loaded");
            inner.durations.record(id, duration_ms);
            Ok(())
        })
    }

    /// Injection point: the player measures the stream length of `id`.
    ///
    /// Returns the recorded original duration, or [`UNSET_DURATION`] to keep
    /// whatever the replacement data says.
    pub fn resolve_duration(&self, id: &str) -> DurationMs {
        self.guarded("resolve_duration", UNSET_DURATION, |inner| {
            if id.is_empty() {
                return Ok(UNSET_DURATION);
            }
            let duration_ms = inner.durations.resolve(id);
            if !is_unset(duration_ms) {
                debug!(video_id = %id, duration_ms, "Replacing video length");
            }
            Ok(duration_ms)
        })
    }

    /// Injection point: a request with `body` is about to be sent to `uri`.
    ///
    /// Drops the body of POSTs to playback endpoints, which belong to the
    /// original stream and must not be sent alongside the replacement.
    pub fn filter_request_body(
        &self,
        uri: &str,
        method: i32,
        body: Option<Bytes>,
    ) -> Option<Bytes> {
        self.guarded("filter_request_body", body.clone(), |_| {
            if method != METHOD_POST {
                return Ok(body);
            }
            let uri: Uri = uri.parse()?;
            if uri.path().contains(PLAYBACK_PATH_MARKER) {
                debug!(path = uri.path(), "Removing playback request body");
                #[cfg(feature = "metrics")]
                metrics::counter!(*BODIES_SUPPRESSED).increment(1);
                return Ok(None);
            }
            Ok(body)
        })
    }

    /// Injection point: the player renders its diagnostic format label.
    ///
    /// When label annotation is enabled, appends the client the data was
    /// fetched as, e.g. `"1080p60 (ANDROID_VR)"` in forced left-to-right
    /// layout. Empty labels are returned unchanged.
    pub fn annotate_label(&self, label: &str, client_name: &str) -> String {
        self.guarded("annotate_label", label.to_owned(), |inner| {
            if !inner.flags.annotate_label_enabled() || label.is_empty() {
                return Ok(label.to_owned());
            }
            if client_name.is_empty() {
                debug!("No client name to annotate the label with");
                return Ok(label.to_owned());
            }
            Ok(format!(
                "{LEFT_TO_RIGHT_OVERRIDE}{label}{THIN_SPACE}({client_name})"
            ))
        })
    }

    /// [`annotate_label`](Self::annotate_label) with the client of the most
    /// recent successful fetch. Unchanged label if no fetch has succeeded.
    pub fn annotate_label_with_last_client(&self, label: &str) -> String {
        match self.last_client_name() {
            Some(client) => self.annotate_label(label, &client),
            None => label.to_owned(),
        }
    }

    /// Whether the master switch is on.
    pub fn is_enabled(&self) -> bool {
        self.inner.flags.override_enabled()
    }

    /// Injection point: live HLS current-time fix.
    ///
    /// Replacement live streams report their own current time, so the player's
    /// fix must be turned off while overriding.
    pub fn fix_hls_current_time(&self, original: bool) -> bool {
        if self.is_enabled() { false } else { original }
    }

    /// Whether audio track language selection can be offered.
    ///
    /// Only the [`ClientType::AndroidVrNoAuth`] client returns all audio tracks.
    pub fn audio_language_override_available(&self) -> bool {
        self.is_enabled() && self.inner.flags.client_type() == ClientType::AndroidVrNoAuth
    }

    /// Client of the most recent successful fetch.
    pub fn last_client_name(&self) -> Option<ClientName> {
        self.inner.registry.last_client_name()
    }

    /// The fetch registry of this coordinator.
    pub fn registry(&self) -> &FetchRegistry {
        &self.inner.registry
    }

    /// The duration fallback cache of this coordinator.
    pub fn durations(&self) -> &DurationFallbackCache {
        &self.inner.durations
    }

    /// Forget every fetch of the current session.
    ///
    /// Fallback durations are kept; they are bounded and outlive sessions.
    pub fn end_session(&self) {
        self.inner.registry.clear();
    }
}

/// Marker type for unset builder fields.
///
/// When you see `NotSet` in a compiler error, it means
/// [`fetcher`](OverrideCoordinatorBuilder::fetcher) has not been called yet.
pub struct NotSet;

/// Builder for [`OverrideCoordinator`].
///
/// Only the fetcher is required. Defaults:
/// - flags and sizing from [`OverrideConfig::default`]
/// - identifiers read from the `id` query parameter ([`QueryIdParser`])
/// - latency-sensitive threads detected by [`LatencyMarkedThreads`]
/// - fetches spawned on the runtime current at [`build`](OverrideCoordinatorBuilder::build)
pub struct OverrideCoordinatorBuilder<F> {
    fetcher: F,
    config: OverrideConfig,
    flags: Option<Arc<dyn FeatureFlags>>,
    parser: Arc<dyn IdentifierParser>,
    probe: Arc<dyn ThreadProbe>,
    runtime: Option<Handle>,
    on_premature_read: Option<PrematureReadHook>,
}

impl OverrideCoordinatorBuilder<NotSet> {
    /// Creates a new builder with no fetcher set.
    pub fn new() -> Self {
        Self {
            fetcher: NotSet,
            config: OverrideConfig::default(),
            flags: None,
            parser: Arc::new(QueryIdParser::default()),
            probe: Arc::new(LatencyMarkedThreads),
            runtime: None,
            on_premature_read: None,
        }
    }
}

impl Default for OverrideCoordinatorBuilder<NotSet> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> OverrideCoordinatorBuilder<F> {
    /// Sets the fetcher of replacement streaming data.
    pub fn fetcher<NewF>(self, fetcher: NewF) -> OverrideCoordinatorBuilder<NewF>
    where
        NewF: StreamFetcher + 'static,
    {
        OverrideCoordinatorBuilder {
            fetcher,
            config: self.config,
            flags: self.flags,
            parser: self.parser,
            probe: self.probe,
            runtime: self.runtime,
            on_premature_read: self.on_premature_read,
        }
    }

    /// Sets the configuration.
    ///
    /// The configuration is also the flag source unless
    /// [`flags`](Self::flags) is called.
    pub fn config(self, config: OverrideConfig) -> Self {
        Self { config, ..self }
    }

    /// Sets a live flag source, overriding the flags of the configuration.
    pub fn flags(self, flags: impl FeatureFlags + 'static) -> Self {
        Self {
            flags: Some(Arc::new(flags)),
            ..self
        }
    }

    /// Sets the identifier parser.
    pub fn parser(self, parser: impl IdentifierParser + 'static) -> Self {
        Self {
            parser: Arc::new(parser),
            ..self
        }
    }

    /// Sets the latency-sensitive thread probe.
    pub fn thread_probe(self, probe: impl ThreadProbe + 'static) -> Self {
        Self {
            probe: Arc::new(probe),
            ..self
        }
    }

    /// Sets the runtime fetches are spawned on.
    pub fn runtime(self, runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
            ..self
        }
    }

    /// Sets the callback fired on premature reads.
    ///
    /// Only called when diagnostic logging is enabled. Must not block.
    pub fn on_premature_read(self, hook: impl Fn(&VideoId) + Send + Sync + 'static) -> Self {
        Self {
            on_premature_read: Some(Arc::new(hook)),
            ..self
        }
    }
}

impl<F> OverrideCoordinatorBuilder<F>
where
    F: StreamFetcher + 'static,
{
    /// Builds the [`OverrideCoordinator`].
    ///
    /// # Panics
    ///
    /// Panics if no runtime was set and this is called outside of a tokio runtime.
    pub fn build(self) -> OverrideCoordinator {
        let runtime = self.runtime.unwrap_or_else(Handle::current);
        let fetch_config = self.config.fetch.clone();
        let durations = DurationFallbackCache::new(self.config.duration_cache_capacity);
        let flags: Arc<dyn FeatureFlags> = match self.flags {
            Some(flags) => flags,
            None => Arc::new(self.config),
        };

        OverrideCoordinator {
            inner: Arc::new(CoordinatorInner {
                flags,
                parser: self.parser,
                probe: self.probe,
                registry: FetchRegistry::new(self.fetcher, fetch_config, runtime),
                durations,
                on_premature_read: self.on_premature_read,
            }),
        }
    }
}
