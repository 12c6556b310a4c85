//! Fetch trait for replacement streaming data.
//!
//! The coordinator treats the network request and response parsing as one
//! opaque asynchronous operation keyed by identifier. Completion is observed
//! only through the registry's fetch handle.

use std::sync::Arc;

use async_trait::async_trait;
use smol_str::SmolStr;

use crate::{FetchError, Raw, VideoId};

/// Headers of the intercepted player request, passed to the fetcher unchanged.
pub type RequestContext = http::HeaderMap;

/// Name of the client a replacement stream was requested as (e.g. `ANDROID_VR`).
pub type ClientName = SmolStr;

/// Replacement streaming data produced by a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedStream {
    /// Serialized streaming data that replaces the original payload.
    pub payload: Raw,
    /// Client the data was fetched as.
    pub client: ClientName,
}

impl FetchedStream {
    /// Creates a new fetched stream.
    pub fn new(payload: impl Into<Raw>, client: impl Into<ClientName>) -> Self {
        Self {
            payload: payload.into(),
            client: client.into(),
        }
    }
}

/// Trait for fetching replacement streaming data.
///
/// Implementations perform the actual network round trip. They are called at
/// most once per identifier per session and always from a background task,
/// so they may take as long as they need.
///
/// # Example
///
/// ```ignore
/// use stream_override_core::{FetchError, FetchedStream, RequestContext, StreamFetcher, VideoId};
///
/// struct FixedFetcher;
///
/// #[async_trait::async_trait]
/// impl StreamFetcher for FixedFetcher {
///     async fn fetch(&self, _id: VideoId, _ctx: RequestContext) -> Result<FetchedStream, FetchError> {
///         Ok(FetchedStream::new(vec![0x01, 0x02], "ANDROID_VR"))
///     }
/// }
/// ```
#[async_trait]
pub trait StreamFetcher: Send + Sync {
    /// Fetch replacement streaming data for `id`.
    async fn fetch(&self, id: VideoId, context: RequestContext)
    -> Result<FetchedStream, FetchError>;
}

#[async_trait]
impl<T> StreamFetcher for Arc<T>
where
    T: StreamFetcher + ?Sized,
{
    async fn fetch(
        &self,
        id: VideoId,
        context: RequestContext,
    ) -> Result<FetchedStream, FetchError> {
        self.as_ref().fetch(id, context).await
    }
}

#[async_trait]
impl<T> StreamFetcher for Box<T>
where
    T: StreamFetcher + ?Sized,
{
    async fn fetch(
        &self,
        id: VideoId,
        context: RequestContext,
    ) -> Result<FetchedStream, FetchError> {
        self.as_ref().fetch(id, context).await
    }
}
