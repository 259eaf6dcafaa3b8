//! Rejections and collaborator failures

use std::time::Duration;

use tests::events::count_of;
use tests::fixtures::{test_config, test_listing};
use tests::{AuthCall, DownstreamCall, ResultCode, SessionEvent, SupervisorTestHarness};

// ============================================================================
// Auth Rejection
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_auth_rejection_aborts_until_explicit_connect() {
    let mut harness = SupervisorTestHarness::start(test_config());

    harness.handle.connect().unwrap();
    harness.next_auth_call().await;
    harness.handle.auth_result(ResultCode(7), "banned").unwrap();

    assert_eq!(harness.next_auth_call().await.1, AuthCall::AbortSession);
    harness.expect_no_auth_call(Duration::from_secs(600)).await;
    assert_eq!(harness.auth.abort_count(), 1);
    assert_eq!(harness.auth.connect_count(), 1);

    let events = harness.collect_events();
    let rejected = events.iter().find_map(|e| match e {
        SessionEvent::AuthRejected { code, message, .. } => Some((*code, message.clone())),
        _ => None,
    });
    assert_eq!(rejected, Some((ResultCode(7), Some("banned".to_string()))));

    // An explicit connect starts a fresh cycle
    harness.handle.connect().unwrap();
    let (_, call) = harness.next_auth_call().await;
    assert!(matches!(call, AuthCall::Connect(_)), "got {:?}", call);

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_after_rejection_still_retries() {
    let mut harness = SupervisorTestHarness::start(test_config());

    harness.handle.connect().unwrap();
    harness.next_auth_call().await;
    harness.handle.auth_result(ResultCode(7), "").unwrap();
    harness.next_auth_call().await;

    // The server closes the socket after the abort
    harness.handle.auth_disconnected().unwrap();

    let (_, call) = harness.next_auth_call().await;
    assert!(matches!(call, AuthCall::Connect(_)), "got {:?}", call);

    harness.stop().await;
}

// ============================================================================
// Collaborator Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_failed_connect_is_retried() {
    let mut harness = SupervisorTestHarness::start(test_config().with_reconnect_delay_ms(250));
    harness.auth.fail_next_connects(2);

    harness.handle.connect().unwrap();

    let (first, _) = harness.next_auth_call().await;
    let (second, _) = harness.next_auth_call().await;
    let (third, _) = harness.next_auth_call().await;

    assert_eq!(second.duration_since(first), Duration::from_millis(250));
    assert_eq!(third.duration_since(second), Duration::from_millis(250));
    assert_eq!(harness.auth.connect_count(), 3);
    assert_eq!(count_of(&harness.collect_events(), "reconnect_scheduled"), 2);

    harness.expect_no_auth_call(Duration::from_secs(60)).await;

    harness.stop().await;
}

#[tokio::test]
async fn test_shutdown_stops_immediate_retry_loop() {
    let mut harness = SupervisorTestHarness::start(test_config());
    harness.auth.fail_next_connects(usize::MAX);

    harness.handle.connect().unwrap();
    for _ in 0..50 {
        let (_, call) = harness.next_auth_call().await;
        assert!(matches!(call, AuthCall::Connect(_)), "got {:?}", call);
    }

    let handle = harness.handle.clone();
    tokio::time::timeout(Duration::from_secs(2), harness.stop())
        .await
        .expect("supervisor kept retrying after shutdown");
    assert!(handle.connect().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_downstream_abort_failure_is_not_fatal() {
    let mut harness = SupervisorTestHarness::start(test_config().with_watchdog_secs(5));
    harness.downstream.fail_aborts(true);

    harness.drive_to_selection(test_listing()).await;
    harness.next_downstream_call().await;
    assert_eq!(
        harness.next_downstream_call().await.1,
        DownstreamCall::AbortSession
    );

    // Supervisor keeps processing inputs
    harness.handle.downstream_disconnected().unwrap();
    let (_, call) = harness.next_auth_call().await;
    assert!(matches!(call, AuthCall::Connect(_)), "got {:?}", call);

    harness.stop().await;
}
