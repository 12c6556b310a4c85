//! Test helpers for the stream override integration tests.

pub mod flags;
pub mod mock_fetcher;
pub mod tracing;

pub use flags::ToggleFlags;
pub use mock_fetcher::{CountingFetcher, MockFetcher};
pub use self::tracing::{CapturedEvent, EventCollector, create_event_collector, with_event_capture};

use std::time::Duration;

use stream_override::FetchRegistry;

/// Poll until the fetch for `id` has finished, or panic after `timeout`.
pub async fn wait_until_complete(registry: &FetchRegistry, id: &str, timeout: Duration) {
    let wait = async {
        loop {
            if let Some(handle) = registry.lookup(id) {
                handle.wait().await;
                return;
            }
            tokio::task::yield_now().await;
        }
    };
    if tokio::time::timeout(timeout, wait).await.is_err() {
        panic!("fetch for {id} did not complete within {timeout:?}");
    }
}
