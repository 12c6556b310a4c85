//! Tests for master switch gating and live flag changes.

use std::time::Duration;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use stream_override::{
    ClientType, METHOD_POST, OverrideConfig, OverrideCoordinator, RequestContext, UNSET_DURATION,
};
use stream_override_test::{MockFetcher, ToggleFlags, wait_until_complete, with_event_capture};
use tracing::Level;

const TIMEOUT: Duration = Duration::from_secs(5);
const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player?id=abc123";
const PLAYBACK_URL: &str = "https://rr3.googlevideo.com/videoplayback?id=abc123&itag=22";

#[tokio::test]
async fn test_disabled_coordinator_is_pass_through() {
    let fetcher = MockFetcher::new();
    fetcher.complete("abc123", vec![0x01], "ANDROID_VR");
    let coordinator = OverrideCoordinator::builder()
        .fetcher(fetcher.clone())
        .config(OverrideConfig::disabled())
        .build();
    let body = Some(Bytes::from_static(b"playback body"));

    coordinator.initiate(PLAYER_URL, RequestContext::new());
    coordinator.record_fallback_duration("abc123", 1_000);
    tokio::task::yield_now().await;

    assert!(!coordinator.is_enabled());
    assert!(coordinator.registry().is_empty());
    assert_eq!(fetcher.total_calls(), 0);
    assert!(coordinator.durations().is_empty());
    assert_eq!(coordinator.fetch_override_bytes("abc123"), None);
    assert_eq!(coordinator.resolve_duration("abc123"), UNSET_DURATION);
    assert_eq!(
        coordinator.filter_request_body(PLAYBACK_URL, METHOD_POST, body.clone()),
        body
    );
    assert_eq!(coordinator.annotate_label("1080p", "ANDROID_VR"), "1080p");
}

#[tokio::test]
async fn test_toggling_master_switch_hides_existing_state() {
    let fetcher = MockFetcher::new();
    let flags = ToggleFlags::enabled();
    let coordinator = OverrideCoordinator::builder()
        .fetcher(fetcher.clone())
        .flags(flags.clone())
        .build();

    fetcher.complete("abc123", vec![0x01, 0x02], "ANDROID_VR");
    coordinator.initiate(PLAYER_URL, RequestContext::new());
    coordinator.record_fallback_duration("abc123", 212_000);
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;
    assert!(coordinator.fetch_override_bytes("abc123").is_some());

    flags.set_enabled(false);
    assert_eq!(coordinator.fetch_override_bytes("abc123"), None);
    assert_eq!(coordinator.resolve_duration("abc123"), UNSET_DURATION);
    assert!(coordinator.fix_hls_current_time(true));

    // State survived while switched off
    flags.set_enabled(true);
    assert_eq!(
        coordinator.fetch_override_bytes("abc123"),
        Some(Bytes::from_static(&[0x01, 0x02]))
    );
    assert_eq!(coordinator.resolve_duration("abc123"), 212_000);
    assert!(!coordinator.fix_hls_current_time(true));
}

#[tokio::test]
async fn test_label_annotation_follows_live_flag() {
    let fetcher = MockFetcher::new();
    let flags = ToggleFlags::enabled();
    let coordinator = OverrideCoordinator::builder()
        .fetcher(fetcher.clone())
        .flags(flags.clone())
        .build();

    assert_eq!(coordinator.annotate_label("1080p60", "IOS"), "1080p60");

    flags.set_annotate_label(true);
    assert_eq!(
        coordinator.annotate_label("1080p60", "IOS"),
        "\u{202D}1080p60\u{2009}(IOS)"
    );

    fetcher.complete("abc123", vec![0x01], "ANDROID_VR_NO_AUTH");
    coordinator.initiate(PLAYER_URL, RequestContext::new());
    wait_until_complete(coordinator.registry(), "abc123", TIMEOUT).await;
    assert_eq!(
        coordinator.annotate_label_with_last_client("720p"),
        "\u{202D}720p\u{2009}(ANDROID_VR_NO_AUTH)"
    );
}

#[tokio::test]
async fn test_audio_language_follows_client_type() {
    let flags = ToggleFlags::enabled().with_client(ClientType::AndroidVrNoAuth);
    let coordinator = OverrideCoordinator::builder()
        .fetcher(MockFetcher::new())
        .flags(flags.clone())
        .build();
    assert!(coordinator.audio_language_override_available());

    flags.set_enabled(false);
    assert!(!coordinator.audio_language_override_available());
}

#[tokio::test]
async fn test_request_body_filtering() {
    let coordinator = OverrideCoordinator::builder()
        .fetcher(MockFetcher::new())
        .build();
    let body = Some(Bytes::from_static(b"playback body"));

    assert_eq!(
        coordinator.filter_request_body(PLAYBACK_URL, METHOD_POST, body.clone()),
        None
    );
    assert_eq!(
        coordinator.filter_request_body(PLAYBACK_URL, 0, body.clone()),
        body
    );
    assert_eq!(
        coordinator.filter_request_body(
            "https://www.youtube.com/api/stats/watchtime",
            METHOD_POST,
            body.clone()
        ),
        body
    );
    assert_eq!(
        coordinator.filter_request_body(PLAYBACK_URL, METHOD_POST, None),
        None
    );
}

#[tokio::test]
async fn test_label_without_client_name_is_unchanged_and_not_an_error() {
    let coordinator = OverrideCoordinator::builder()
        .fetcher(MockFetcher::new())
        .config(OverrideConfig::builder().annotate_label(true).build())
        .build();

    let (label, collector) = with_event_capture(|| coordinator.annotate_label("1080p60", ""));

    assert_eq!(label, "1080p60");
    assert!(collector.at_level(Level::ERROR).is_empty());
}
