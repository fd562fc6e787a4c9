//! Tests for event acceptance
//!
//! Validates the space gate, flow-id ordering, has_connected_before
//! stickiness, auth countdown handling and feature discovery.

use mcpmux_client::format_auth_countdown;
use mcpmux_core::{ConnectionStatus, ServerStatusResponse, UiEvent};
use pretty_assertions::assert_eq;
use tests::events::*;
use tests::MockBackend;
use uuid::Uuid;

use super::harness;

#[tokio::test]
async fn test_scenario_newer_event_replaces_snapshot() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new().with_statuses(
        space,
        vec![ServerStatusResponse::new("gh", ConnectionStatus::Connecting, 1)],
    ));
    h.store.attach(space).await;
    assert_eq!(h.store.status("gh"), Some(ConnectionStatus::Connecting));

    h.hub
        .dispatch(&status_event(space, "gh", ConnectionStatus::Connected, 2));

    let record = h.store.record("gh").expect("record exists");
    assert_eq!(record.status, ConnectionStatus::Connected);
    assert_eq!(record.flow_id, 2);
}

#[tokio::test]
async fn test_scenario_event_for_other_space_is_ignored() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new().with_statuses(
        space,
        vec![ServerStatusResponse::new("gh", ConnectionStatus::Connecting, 1)],
    ));
    h.store.attach(space).await;

    h.hub.dispatch(&status_event(
        Uuid::new_v4(),
        "gh",
        ConnectionStatus::Connected,
        2,
    ));

    let record = h.store.record("gh").expect("record exists");
    assert_eq!(record.status, ConnectionStatus::Connecting);
    assert_eq!(record.flow_id, 1);
}

#[tokio::test]
async fn test_older_flow_is_rejected_newer_is_applied() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new().with_statuses(
        space,
        vec![ServerStatusResponse::new("gh", ConnectionStatus::Connected, 5)],
    ));
    h.store.attach(space).await;

    h.hub
        .dispatch(&status_event(space, "gh", ConnectionStatus::Error, 3));
    assert_eq!(h.store.status("gh"), Some(ConnectionStatus::Connected));
    assert_eq!(h.store.record("gh").map(|r| r.flow_id), Some(5));

    h.hub
        .dispatch(&status_event(space, "gh", ConnectionStatus::Error, 10));
    assert_eq!(h.store.status("gh"), Some(ConnectionStatus::Error));
    assert_eq!(h.store.record("gh").map(|r| r.flow_id), Some(10));
}

#[tokio::test]
async fn test_equal_flow_is_accepted() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new());
    h.store.attach(space).await;

    h.hub
        .dispatch(&status_event(space, "gh", ConnectionStatus::Connecting, 4));
    h.hub
        .dispatch(&status_event(space, "gh", ConnectionStatus::Connected, 4));

    assert_eq!(h.store.status("gh"), Some(ConnectionStatus::Connected));
}

#[tokio::test]
async fn test_foreign_space_never_creates_records() {
    let space = Uuid::new_v4();
    let other = Uuid::new_v4();
    let h = harness(MockBackend::new());
    h.store.attach(space).await;

    for flow_id in [0, 1, u64::MAX] {
        h.hub
            .dispatch(&status_event(other, "gh", ConnectionStatus::Connected, flow_id));
        h.hub.dispatch(&auth_progress_event(other, "gh", 120, flow_id));
    }
    h.hub.dispatch(&features_event(other, "gh", &["search"]));

    assert!(h.store.snapshot().is_empty());
    assert_eq!(h.store.auth_remaining("gh"), None);
    assert_eq!(h.store.features("gh"), None);
    assert!(!h.store.is_expanded("gh"));
}

#[tokio::test]
async fn test_has_connected_before_is_sticky() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new());
    h.store.attach(space).await;

    let mut connected = status_payload(space, "gh", ConnectionStatus::Connected, 1);
    connected.has_connected_before = true;
    h.hub.dispatch(&UiEvent::status_changed(&connected));
    assert!(h.store.has_connected_before("gh"));

    for (flow_id, status) in [
        (2, ConnectionStatus::Disconnected),
        (3, ConnectionStatus::Error),
        (4, ConnectionStatus::Connecting),
    ] {
        h.hub
            .dispatch(&status_event(space, "gh", status, flow_id));
        assert!(h.store.has_connected_before("gh"), "flow {flow_id}");
    }
}

#[tokio::test]
async fn test_auth_countdown_tracks_progress_until_status_changes() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new());
    h.store.attach(space).await;

    h.hub
        .dispatch(&status_event(space, "notion", ConnectionStatus::Authenticating, 7));
    h.hub.dispatch(&auth_progress_event(space, "notion", 125, 7));
    assert_eq!(h.store.auth_remaining("notion"), Some(125));
    assert_eq!(
        format_auth_countdown(125),
        "Authenticating… (2m 5s remaining)"
    );

    // Progress is only space-gated
    h.hub.dispatch(&auth_progress_event(space, "notion", 90, 1));
    assert_eq!(h.store.auth_remaining("notion"), Some(90));

    // Another Authenticating status keeps the countdown
    h.hub
        .dispatch(&status_event(space, "notion", ConnectionStatus::Authenticating, 7));
    assert_eq!(h.store.auth_remaining("notion"), Some(90));

    h.hub
        .dispatch(&status_event(space, "notion", ConnectionStatus::Connected, 7));
    assert_eq!(h.store.auth_remaining("notion"), None);
}

#[tokio::test]
async fn test_features_update_expands_row() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new());
    h.store.attach(space).await;
    assert!(!h.store.is_expanded("gh"));

    h.hub
        .dispatch(&features_event(space, "gh", &["create_issue", "search_code"]));

    assert!(h.store.is_expanded("gh"));
    let features = h.store.features("gh").expect("features recorded");
    assert_eq!(features.tools, vec!["create_issue", "search_code"]);
    assert_eq!(features.total_count(), 2);

    h.store.collapse("gh");
    assert!(!h.store.is_expanded("gh"));
    assert!(h.store.features("gh").is_some());
}

#[tokio::test]
async fn test_malformed_status_payload_is_dropped() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new());
    h.store.attach(space).await;

    let invoked = h.hub.dispatch(&UiEvent::new(
        mcpmux_core::channels::SERVER_STATUS_CHANGED,
        serde_json::json!({ "server_id": "gh", "status": "connected" }),
    ));

    assert_eq!(invoked, 1);
    assert!(h.store.snapshot().is_empty());
}
