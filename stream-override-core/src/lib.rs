#![warn(missing_docs)]
//! # stream-override-core
//!
//! Core types and collaborator traits for the stream override coordinator.
//!
//! This crate defines the vocabulary shared between the coordinator
//! (`stream-override`) and the pieces of the player it plugs into:
//!
//! - **Identify** content with [`VideoId`]
//! - **Parse** identifiers out of request URLs ([`IdentifierParser`])
//! - **Fetch** replacement streaming data ([`StreamFetcher`])
//! - **Read** feature flags ([`FeatureFlags`])
//! - **Classify** the calling thread ([`ThreadProbe`])
//! - **Warm up** the alternate token source ([`TokenWarmup`])
//!
//! Nothing here spawns tasks or holds shared state; that lives in the
//! `stream-override` crate.

pub mod duration;
pub mod error;
pub mod fetch;
pub mod flags;
pub mod identifier;
pub mod latency;
pub mod parser;
pub mod warmup;

pub use duration::{DurationMs, UNSET_DURATION, is_unset};
pub use error::{FetchError, WarmupError};
pub use fetch::{ClientName, FetchedStream, RequestContext, StreamFetcher};
pub use flags::{ClientType, FeatureFlags};
pub use identifier::VideoId;
pub use latency::{LatencyMarkedThreads, ThreadProbe, mark_latency_sensitive};
pub use parser::{IdentifierParser, QueryIdParser};
pub use warmup::TokenWarmup;

#[doc(hidden)]
pub use smol_str::SmolStr;

/// Raw streaming data payload.
/// Using `Bytes` keeps clones cheap when the same payload is served repeatedly.
pub type Raw = bytes::Bytes;
