//! # stream-override
//!
//! Replaces a media player's streaming data with data fetched from an
//! alternate source, without ever blocking or breaking playback.
//!
//! The [`OverrideCoordinator`] is wired into the player at a handful of
//! injection points:
//!
//! | Player event | Coordinator call |
//! |--------------|------------------|
//! | player request sent | [`initiate`](OverrideCoordinator::initiate) |
//! | streaming data parsed | [`fetch_override_bytes`](OverrideCoordinator::fetch_override_bytes) |
//! | original duration seen | [`record_fallback_duration`](OverrideCoordinator::record_fallback_duration) |
//! | stream length measured | [`resolve_duration`](OverrideCoordinator::resolve_duration) |
//! | request body about to be sent | [`filter_request_body`](OverrideCoordinator::filter_request_body) |
//! | format label rendered | [`annotate_label`](OverrideCoordinator::annotate_label) |
//!
//! Fetches are deduplicated per identifier by the [`FetchRegistry`] and run
//! on a tokio runtime. Reads never wait: an unfinished fetch simply means the
//! original data is used this time.
//!
//! ```ignore
//! use stream_override::{OverrideConfig, OverrideCoordinator};
//!
//! let coordinator = OverrideCoordinator::builder()
//!     .fetcher(my_fetcher)
//!     .config(OverrideConfig::default())
//!     .runtime(runtime.handle().clone())
//!     .build();
//!
//! coordinator.initiate(url, headers);
//! // ... later, on the playback thread
//! let bytes = coordinator.fetch_override_bytes("dQw4w9WgXcQ");
//! ```
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Bounded fallback cache for original stream durations.
pub mod cache;

/// Coordinator configuration.
pub mod config;

/// The coordinator and its builder.
pub mod coordinator;

/// Error types for coordinator operations.
pub mod error;

/// Metrics collection.
///
/// When the `metrics` feature is enabled, this module provides counters
/// and histograms for:
/// - Fetches started, deduplicated and failed, and their duration
/// - Reads served with or without replacement data
/// - Premature reads on latency-sensitive threads
pub mod metrics;

pub mod registry;

/// Startup warm-up task.
pub mod warmup;

pub use cache::DurationFallbackCache;
pub use config::{OverrideConfig, OverrideConfigBuilder};
pub use coordinator::{
    METHOD_POST, NotSet, OverrideCoordinator, OverrideCoordinatorBuilder, PrematureReadHook,
};
pub use error::OverrideError;
pub use registry::{FetchConfig, FetchHandle, FetchRegistry, TimeoutPolicy};
pub use warmup::spawn_warmup;

pub use stream_override_core::{
    ClientName, ClientType, DurationMs, FeatureFlags, FetchError, FetchedStream,
    IdentifierParser, QueryIdParser, Raw, RequestContext, StreamFetcher, ThreadProbe,
    TokenWarmup, UNSET_DURATION, VideoId, WarmupError, mark_latency_sensitive,
};

/// The `stream-override` prelude.
///
/// ```rust
/// use stream_override::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        FeatureFlags, OverrideConfig, OverrideCoordinator, StreamFetcher, UNSET_DURATION, VideoId,
    };
}
