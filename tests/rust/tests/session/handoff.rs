//! Server selection and downstream hand-off tests

use pretty_assertions::assert_eq;
use std::time::Duration;

use tests::events::{count_of, state_trail};
use tests::fixtures::{listing_without_target, test_config, test_listing, TARGET_INDEX};
use tests::{AuthCall, DownstreamCall, ResultCode, SessionEvent, SessionState, SupervisorTestHarness};

// ============================================================================
// Server Selection
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_first_matching_entry_names_the_session() {
    let mut harness = SupervisorTestHarness::start(test_config());

    harness.drive_to_selection(test_listing()).await;

    let (_, call) = harness.next_downstream_call().await;
    assert_eq!(call, DownstreamCall::SetDisplayName("Beta".to_string()));
    assert!(harness
        .auth
        .calls()
        .contains(&AuthCall::SelectServer(TARGET_INDEX)));

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_missing_server_is_still_selected() {
    let mut harness = SupervisorTestHarness::start(test_config());

    harness.drive_to_selection(listing_without_target()).await;

    assert!(harness
        .auth
        .calls()
        .contains(&AuthCall::SelectServer(TARGET_INDEX)));
    harness.expect_no_downstream_call(Duration::from_secs(1)).await;
    assert_eq!(harness.downstream.display_name(), None);

    let events = harness.collect_events();
    let missing = events.iter().find_map(|e| match e {
        SessionEvent::ServerMissing { available, .. } => Some(available.len()),
        _ => None,
    });
    assert_eq!(missing, Some(2));

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_missing_server_aborts_when_selection_disabled() {
    let mut harness =
        SupervisorTestHarness::start(test_config().with_select_missing_server(false));

    harness.handle.connect().unwrap();
    harness.next_auth_call().await;
    harness.handle.auth_result(ResultCode::SUCCESS, "").unwrap();
    harness.next_auth_call().await;
    harness
        .handle
        .server_list(listing_without_target(), 1)
        .unwrap();

    assert_eq!(harness.next_auth_call().await.1, AuthCall::AbortSession);
    harness.expect_no_auth_call(Duration::from_secs(60)).await;
    assert_eq!(harness.auth.connect_count(), 1);

    harness.stop().await;
}

// ============================================================================
// Downstream Results
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_full_cycle_reaches_live() {
    let mut harness = SupervisorTestHarness::start(test_config());

    harness.drive_to_selection(test_listing()).await;
    harness.handle.downstream_result(ResultCode::SUCCESS).unwrap();
    harness.expect_no_auth_call(Duration::from_secs(1)).await;

    let events = harness.collect_events();
    assert_eq!(
        state_trail(&events),
        vec![
            SessionState::ConnectingAuth,
            SessionState::ListingServers,
            SessionState::ConnectingDownstream,
            SessionState::Live,
        ]
    );
    assert_eq!(count_of(&events, "server_resolved"), 1);

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_downstream_rejection_aborts_without_retry() {
    let mut harness = SupervisorTestHarness::start(test_config());

    harness.drive_to_selection(test_listing()).await;
    harness.handle.downstream_result(ResultCode(12)).unwrap();

    assert_eq!(harness.next_auth_call().await.1, AuthCall::AbortSession);
    harness.expect_no_auth_call(Duration::from_secs(60)).await;
    assert_eq!(harness.auth.connect_count(), 1);

    let events = harness.collect_events();
    assert_eq!(count_of(&events, "downstream_rejected"), 1);
    assert_eq!(state_trail(&events).last(), Some(&SessionState::Aborted));

    harness.stop().await;
}
