//! Tests for connection actions
//!
//! Actions call exactly one backend command for the bound space and never
//! change a status locally.

use mcpmux_client::bridge::names;
use mcpmux_client::ClientError;
use mcpmux_core::{ConnectionStatus, ServerStatusResponse};
use pretty_assertions::assert_eq;
use tests::{MockBackend, RecordedCall};
use uuid::Uuid;

use super::harness;

#[tokio::test]
async fn test_actions_call_backend_for_bound_space() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new().with_statuses(
        space,
        vec![ServerStatusResponse::new("notion", ConnectionStatus::OAuthRequired, 3)],
    ));
    h.store.attach(space).await;

    h.store.enable("notion").await.expect("enable");
    h.store.connect("notion").await.expect("connect");
    h.store.cancel("notion").await.expect("cancel");
    h.store.retry("notion").await.expect("retry");
    h.store.disable("notion").await.expect("disable");

    let actions: Vec<RecordedCall> = h
        .backend
        .calls()
        .into_iter()
        .filter(|c| c.command != names::GET_SERVER_STATUSES)
        .collect();
    let expected: Vec<RecordedCall> = [
        names::ENABLE_SERVER,
        names::START_AUTH,
        names::CANCEL_AUTH,
        names::RETRY_CONNECTION,
        names::DISABLE_SERVER,
    ]
    .into_iter()
    .map(|command| RecordedCall {
        command,
        space_id: Some(space),
        server_id: Some("notion".to_string()),
    })
    .collect();
    assert_eq!(actions, expected);

    // Status only moves on push events
    let record = h.store.record("notion").expect("record kept");
    assert_eq!(record.status, ConnectionStatus::OAuthRequired);
    assert_eq!(record.flow_id, 3);
    assert!(!h.store.is_pending("notion"));
    assert!(h.notifier.errors().is_empty());
}

#[tokio::test]
async fn test_failed_action_notifies_and_returns_error() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new());
    h.store.attach(space).await;
    h.backend.fail(names::RETRY_CONNECTION, "gateway not running");

    let err = h.store.retry("gh").await.unwrap_err();

    match err {
        ClientError::Command { command, message } => {
            assert_eq!(command, names::RETRY_CONNECTION);
            assert!(message.contains("gateway not running"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        h.notifier.errors(),
        vec!["Failed to retry gh: gateway not running".to_string()]
    );
    assert!(!h.store.is_pending("gh"));
    assert_eq!(h.store.status("gh"), None);
}

#[tokio::test]
async fn test_actions_before_attach_are_rejected() {
    let h = harness(MockBackend::new());

    assert!(matches!(
        h.store.enable("gh").await,
        Err(ClientError::NotAttached)
    ));
    assert!(matches!(
        h.store.connect("gh").await,
        Err(ClientError::NotAttached)
    ));
    assert!(h.backend.calls().is_empty());
    assert!(!h.store.is_pending("gh"));
}

#[tokio::test]
async fn test_actions_after_detach_are_rejected() {
    let space = Uuid::new_v4();
    let h = harness(MockBackend::new());
    h.store.attach(space).await;
    h.store.detach();

    assert!(matches!(
        h.store.disable("gh").await,
        Err(ClientError::NotAttached)
    ));
    assert_eq!(h.backend.call_count(names::DISABLE_SERVER), 0);
}
