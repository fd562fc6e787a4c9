//! Tests for view-model merge
//!
//! Validates one view model per id, installed-state defaults, required
//! input detection, and the offline fallback for installations without a
//! catalog definition.

use std::collections::HashSet;

use mcpmux_client::connection::{action_for, ServerAction};
use mcpmux_client::registry::{merge, ServerViewModel, DEFINITION_NOT_CACHED};
use mcpmux_core::{AuthType, ConnectionStatus, InstalledServer};
use pretty_assertions::assert_eq;
use tests::fixtures::*;

fn ids(view_models: &[ServerViewModel]) -> Vec<&str> {
    view_models.iter().map(ServerViewModel::id).collect()
}

#[test]
fn test_every_entity_appears_exactly_once() {
    let definitions = vec![
        definition("gh", "GitHub"),
        definition("fs", "Filesystem"),
        definition("brave", "Brave Search"),
    ];
    let installed = vec![
        InstalledServer::new("space", "fs").with_enabled(true),
        InstalledServer::new("space", "slack").with_definition(&definition("slack", "Slack")),
        InstalledServer::new("space", "notion").with_name("Notion"),
    ];

    let merged = merge(&definitions, &installed);

    assert_eq!(ids(&merged), vec!["gh", "fs", "brave", "slack", "notion"]);
    let unique: HashSet<&str> = ids(&merged).into_iter().collect();
    assert_eq!(unique.len(), merged.len());

    for vm in &merged {
        let expect_installed = installed.iter().any(|s| s.server_id == vm.id());
        assert_eq!(vm.is_installed, expect_installed, "{}", vm.id());
    }
}

#[test]
fn test_scenario_uninstalled_definition_is_listed() {
    let merged = merge(&[definition("gh", "GitHub")], &[]);

    assert_eq!(merged.len(), 1);
    let gh = &merged[0];
    assert!(!gh.is_installed);
    assert!(!gh.enabled);
    assert!(!gh.oauth_connected);
    assert!(gh.input_values.is_empty());
    assert!(gh.args_append.is_empty());
    assert_eq!(gh.connection_status, ConnectionStatus::Disconnected);
    assert_eq!(action_for(gh, None), ServerAction::Enable);
}

#[test]
fn test_scenario_enabled_without_required_input_needs_configuration() {
    let merged = merge(
        &[definition_with_required_input("gh", "GitHub", "TOKEN")],
        &[InstalledServer::new("space", "gh").with_enabled(true)],
    );

    let gh = &merged[0];
    assert!(gh.missing_required_inputs);
    assert_eq!(gh.connection_status, ConnectionStatus::Connecting);
    assert_eq!(action_for(gh, Some(ConnectionStatus::Connected)), ServerAction::Configure);
}

#[test]
fn test_any_non_empty_value_satisfies_required_input() {
    let def = definition_with_required_input("gh", "GitHub", "TOKEN");

    for (value, missing) in [("", true), (" ", false), ("ghp_123", false)] {
        let state = InstalledServer::new("space", "gh").with_input("TOKEN", value);
        let merged = merge(std::slice::from_ref(&def), &[state]);
        assert_eq!(merged[0].missing_required_inputs, missing, "value {value:?}");
    }
}

#[test]
fn test_installed_state_is_copied_onto_view_model() {
    let mut state = InstalledServer::new("space", "gh")
        .with_enabled(true)
        .with_oauth_connected(true)
        .with_input("ORG", "acme");
    state.args_append = vec!["--read-only".to_string()];
    state
        .env_overrides
        .insert("LOG_LEVEL".to_string(), "debug".to_string());

    let merged = merge(&[oauth_definition("gh", "GitHub")], &[state.clone()]);
    let gh = &merged[0];

    assert!(gh.enabled);
    assert!(gh.oauth_connected);
    assert_eq!(gh.input_values, state.input_values);
    assert_eq!(gh.env_overrides, state.env_overrides);
    assert_eq!(gh.args_append, vec!["--read-only".to_string()]);
    assert_eq!(gh.installed_at, Some(state.created_at));
    assert!(!gh.offline);
}

#[test]
fn test_offline_fallback_prefers_cached_definition() {
    let cached = oauth_definition("notion", "Notion");
    let merged = merge(
        &[],
        &[InstalledServer::new("space", "notion").with_definition(&cached)],
    );

    let notion = &merged[0];
    assert!(notion.offline);
    assert_eq!(notion.name(), "Notion");
    assert_eq!(notion.auth_type(), AuthType::Oauth);
    assert_eq!(notion.definition.categories, vec!["productivity".to_string()]);
    assert_ne!(notion.definition.description.as_deref(), Some(DEFINITION_NOT_CACHED));
}

#[test]
fn test_offline_fallback_without_snapshot_uses_placeholder() {
    let merged = merge(
        &[],
        &[
            InstalledServer::new("space", "missing").with_name("Missing Server"),
            InstalledServer::new("space", "broken").with_cached_json("not json"),
        ],
    );

    assert_eq!(ids(&merged), vec!["missing", "broken"]);
    for vm in &merged {
        assert!(vm.offline);
        assert_eq!(vm.definition.description.as_deref(), Some(DEFINITION_NOT_CACHED));
        assert!(vm.definition.categories.is_empty());
        assert!(vm.definition.inputs().is_empty());
    }
    assert_eq!(merged[0].name(), "Missing Server");
    assert_eq!(merged[1].name(), "broken");
}
