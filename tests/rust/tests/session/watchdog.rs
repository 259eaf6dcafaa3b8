//! Watchdog timer tests
//!
//! The watchdog is armed when a server is selected and stays armed after the
//! session goes live; when it fires the downstream session is forced down.

use std::time::Duration;

use tests::events::count_of;
use tests::fixtures::{test_config, test_listing};
use tests::{AuthCall, DownstreamCall, ResultCode, SupervisorTestHarness};

async fn skip_display_name(harness: &mut SupervisorTestHarness) {
    let (_, call) = harness.next_downstream_call().await;
    assert!(matches!(call, DownstreamCall::SetDisplayName(_)), "got {:?}", call);
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_forces_downstream_abort() {
    let mut harness = SupervisorTestHarness::start(test_config().with_watchdog_secs(10));

    let selected_at = harness.drive_to_selection(test_listing()).await;
    skip_display_name(&mut harness).await;

    harness
        .expect_no_downstream_call(Duration::from_millis(9_999))
        .await;

    let (at, call) = harness.next_downstream_call().await;
    assert_eq!(call, DownstreamCall::AbortSession);
    assert_eq!(at.duration_since(selected_at), Duration::from_secs(10));
    assert_eq!(count_of(&harness.collect_events(), "watchdog_expired"), 1);

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_survives_going_live() {
    let mut harness = SupervisorTestHarness::start(test_config().with_watchdog_secs(10));

    harness.drive_to_selection(test_listing()).await;
    skip_display_name(&mut harness).await;
    harness.handle.downstream_result(ResultCode::SUCCESS).unwrap();

    let (_, call) = harness.next_downstream_call().await;
    assert_eq!(call, DownstreamCall::AbortSession);

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_abort_leads_to_reconnect() {
    let mut harness = SupervisorTestHarness::start(test_config().with_watchdog_secs(10));

    harness.drive_to_selection(test_listing()).await;
    skip_display_name(&mut harness).await;
    harness.next_downstream_call().await;

    // The downstream client reports the forced drop
    harness.handle.downstream_disconnected().unwrap();

    let (_, call) = harness.next_auth_call().await;
    assert!(matches!(call, AuthCall::Connect(_)), "got {:?}", call);
    assert_eq!(harness.auth.connect_count(), 2);

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_disabled_never_aborts() {
    let mut harness = SupervisorTestHarness::start(test_config().with_watchdog_secs(0));

    harness.drive_to_selection(test_listing()).await;
    skip_display_name(&mut harness).await;

    harness
        .expect_no_downstream_call(Duration::from_secs(3_600))
        .await;

    harness.stop().await;
}
