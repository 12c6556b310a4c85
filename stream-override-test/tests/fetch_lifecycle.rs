//! Tests for fetch initiation, deduplication and reads of replacement data.

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, header};
use pretty_assertions::assert_eq;
use stream_override::{OverrideConfig, OverrideCoordinator, RequestContext};
use stream_override_test::{CountingFetcher, MockFetcher, wait_until_complete, with_event_capture};
use tracing::Level;

const TIMEOUT: Duration = Duration::from_secs(5);

fn player_url(id: &str) -> String {
    format!("https://www.youtube.com/youtubei/v1/player?id={id}&prettyPrint=false")
}

fn coordinator(fetcher: &MockFetcher) -> OverrideCoordinator {
    OverrideCoordinator::builder()
        .fetcher(fetcher.clone())
        .config(OverrideConfig::default())
        .build()
}

#[tokio::test]
async fn test_override_available_once_fetch_completes() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    coordinator.initiate(&player_url("abc123"), RequestContext::new());

    // Fetch underway: the read must not wait for it
    assert_eq!(coordinator.fetch_override_bytes("abc123"), None);
    assert!(coordinator.registry().is_in_flight("abc123"));

    fetcher.complete("abc123", vec![0x01, 0x02], "ANDROID_VR");
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;

    assert_eq!(
        coordinator.fetch_override_bytes("abc123"),
        Some(Bytes::from_static(&[0x01, 0x02]))
    );
    assert_eq!(coordinator.last_client_name().as_deref(), Some("ANDROID_VR"));
    assert_eq!(fetcher.calls("abc123"), 1);
}

#[tokio::test]
async fn test_repeated_initiate_fetches_once() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    for _ in 0..3 {
        coordinator.initiate(&player_url("abc123"), RequestContext::new());
    }
    fetcher.complete("abc123", vec![0x01], "IOS");
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;

    // Completed handles are reused too
    coordinator.initiate(&player_url("abc123"), RequestContext::new());
    tokio::task::yield_now().await;

    assert_eq!(fetcher.calls("abc123"), 1);
    assert_eq!(coordinator.registry().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_initiate_from_many_threads_fetches_once() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    let threads: Vec<_> = (0..16)
        .map(|_| {
            let coordinator = coordinator.clone();
            std::thread::spawn(move || {
                coordinator.initiate(&player_url("abc123"), RequestContext::new());
                coordinator.fetch_override_bytes("abc123")
            })
        })
        .collect();
    for thread in threads {
        // Nothing has completed yet, so no thread may see replacement data
        assert_eq!(thread.join().unwrap(), None);
    }

    fetcher.complete("abc123", vec![0x01, 0x02], "ANDROID_VR");
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;

    assert_eq!(fetcher.calls("abc123"), 1);
    assert_eq!(fetcher.total_calls(), 1);
}

#[tokio::test]
async fn test_distinct_ids_fetch_independently() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    coordinator.initiate(&player_url("a"), RequestContext::new());
    coordinator.initiate(&player_url("b"), RequestContext::new());

    fetcher.complete("b", vec![0x0b], "IOS");
    wait_until_complete(coordinator.registry(), "b", TIMEOUT).await;

    assert_eq!(coordinator.fetch_override_bytes("a"), None);
    assert_eq!(
        coordinator.fetch_override_bytes("b"),
        Some(Bytes::from_static(&[0x0b]))
    );
}

#[tokio::test]
async fn test_request_context_passed_through() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static("player/19.0"));
    headers.insert("x-goog-visitor-id", HeaderValue::from_static("visitor"));

    coordinator.initiate(&player_url("abc123"), headers.clone());
    fetcher.complete("abc123", vec![0x01], "ANDROID_VR");
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;

    let contexts = fetcher.contexts();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].0.as_str(), "abc123");
    assert_eq!(contexts[0].1, headers);
}

#[tokio::test]
async fn test_read_before_initiate_is_no_override() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    assert_eq!(coordinator.fetch_override_bytes("abc123"), None);

    fetcher.complete("abc123", vec![0x01, 0x02], "ANDROID_VR");
    coordinator.initiate(&player_url("abc123"), RequestContext::new());
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;

    assert_eq!(
        coordinator.fetch_override_bytes("abc123"),
        Some(Bytes::from_static(&[0x01, 0x02]))
    );
}

#[tokio::test]
async fn test_failed_fetch_keeps_original_data() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    coordinator.initiate(&player_url("abc123"), RequestContext::new());
    fetcher.fail("abc123", "no streamingData");
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;

    assert_eq!(coordinator.fetch_override_bytes("abc123"), None);
    assert_eq!(coordinator.last_client_name(), None);

    // The failed attempt is not retried within the session
    coordinator.initiate(&player_url("abc123"), RequestContext::new());
    tokio::task::yield_now().await;
    assert_eq!(fetcher.calls("abc123"), 1);
}

#[tokio::test]
async fn test_end_session_allows_refetch() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    fetcher.complete("abc123", vec![0x01], "ANDROID_VR");
    coordinator.initiate(&player_url("abc123"), RequestContext::new());
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;

    coordinator.end_session();
    assert!(coordinator.registry().is_empty());
    assert_eq!(coordinator.fetch_override_bytes("abc123"), None);

    coordinator.initiate(&player_url("abc123"), RequestContext::new());
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;
    assert_eq!(fetcher.calls("abc123"), 2);
}

#[tokio::test]
async fn test_unparsable_urls_start_nothing() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    let ((), collector) = with_event_capture(|| {
        coordinator.initiate("https://www.youtube.com/youtubei/v1/player", RequestContext::new());
        coordinator.initiate(&player_url(""), RequestContext::new());
    });

    assert!(coordinator.registry().is_empty());

    // Only the missing id is worth a warning, a blank id is intentional
    let warnings = collector.at_level(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("no id"));
}

#[tokio::test]
async fn test_coordinators_do_not_share_state() {
    let fetcher = MockFetcher::new();
    let first = coordinator(&fetcher);
    let second = coordinator(&fetcher);

    fetcher.complete("abc123", vec![0x01], "ANDROID_VR");
    first.initiate(&player_url("abc123"), RequestContext::new());
    wait_until_complete(first.registry(), "abc123", TIMEOUT).await;
    first.record_fallback_duration("abc123", 1_000);

    assert!(second.registry().lookup("abc123").is_none());
    assert_eq!(second.fetch_override_bytes("abc123"), None);
    assert_eq!(second.resolve_duration("abc123"), stream_override::UNSET_DURATION);
}

#[tokio::test]
async fn test_instant_fetch_is_served_on_next_read() {
    let fetcher = CountingFetcher::new(vec![0x0a, 0x0b]);
    let coordinator = OverrideCoordinator::builder().fetcher(fetcher.clone()).build();

    coordinator.initiate(&player_url("abc123"), RequestContext::new());
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;
    coordinator.initiate(&player_url("abc123"), RequestContext::new());

    assert_eq!(
        coordinator.fetch_override_bytes("abc123"),
        Some(Bytes::from_static(&[0x0a, 0x0b]))
    );
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_completed_fetch_readable_during_duplicate_initiate() {
    let fetcher = MockFetcher::new();
    let coordinator = coordinator(&fetcher);

    fetcher.complete("abc123", vec![0x01, 0x02], "ANDROID_VR");
    coordinator.initiate(&player_url("abc123"), RequestContext::new());
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;

    let network = {
        let coordinator = coordinator.clone();
        std::thread::spawn(move || {
            for _ in 0..20_000 {
                coordinator.initiate(&player_url("abc123"), RequestContext::new());
            }
        })
    };
    let render = {
        let coordinator = coordinator.clone();
        std::thread::spawn(move || {
            (0..20_000)
                .filter(|_| coordinator.fetch_override_bytes("abc123").is_none())
                .count()
        })
    };
    network.join().unwrap();
    let misses = render.join().unwrap();

    assert_eq!(misses, 0);
    assert_eq!(fetcher.calls("abc123"), 1);
}
