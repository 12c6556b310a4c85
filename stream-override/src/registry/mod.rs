//! Deduplicated fetches of replacement streaming data.
//!
//! The registry keeps at most one fetch per identifier for the lifetime of a
//! playback session. Starting a fetch spawns it on a tokio runtime and returns
//! immediately; the result is read later, possibly from another thread,
//! through a non-blocking [`FetchHandle`].
//!
//! # Example
//!
//! ```ignore
//! use stream_override::registry::{FetchConfig, FetchRegistry};
//!
//! let registry = FetchRegistry::new(fetcher, FetchConfig::default(), runtime.handle().clone());
//! registry.start_or_reuse(VideoId::new("abc123"), headers);
//!
//! // Later, on the rendering thread:
//! if let Some(bytes) = registry.lookup("abc123").and_then(|h| h.bytes()) {
//!     // serve the replacement
//! }
//! ```

mod manager;
mod policy;

pub use manager::{FetchHandle, FetchRegistry};
pub use policy::{FetchConfig, FetchConfigBuilder, TimeoutPolicy};
