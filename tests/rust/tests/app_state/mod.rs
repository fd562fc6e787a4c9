//! AppStateStore integration tests
//!
//! Validates that only the persisted subset reaches storage and that a
//! restored store starts from it.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use mcpmux_client::app_state::keys;
use mcpmux_client::{
    AppStateStore, ClientError, JsonFileSettingsRepository, Page, SettingsRepository, Theme,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use uuid::Uuid;

/// In-memory repository that records every write
#[derive(Default)]
struct RecordingRepository {
    data: Mutex<BTreeMap<String, String>>,
    writes: Mutex<Vec<String>>,
    read_only: bool,
}

impl RecordingRepository {
    fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl SettingsRepository for RecordingRepository {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.read_only {
            return Err(anyhow!("settings storage is read-only"));
        }
        self.writes.lock().push(key.to_string());
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.writes.lock().push(key.to_string());
        self.data.lock().remove(key);
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        Ok(self
            .data
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[tokio::test]
async fn test_fresh_store_uses_defaults() {
    let store = AppStateStore::restore(Arc::new(RecordingRepository::default())).await;

    let state = store.state();
    assert_eq!(state.active_space_id, None);
    assert_eq!(state.view_space_id, None);
    assert_eq!(state.theme, Theme::System);
    assert!(!state.sidebar_collapsed);
    assert_eq!(state.navigation, Page::Dashboard);
}

#[tokio::test]
async fn test_transient_fields_are_never_persisted() {
    let repo = Arc::new(RecordingRepository::default());
    let store = AppStateStore::restore(repo.clone()).await;

    store.navigate(Page::Registry);
    store.set_view_space(Some(Uuid::new_v4()));

    assert!(repo.writes().is_empty());
    assert_eq!(store.state().navigation, Page::Registry);
}

#[tokio::test]
async fn test_unchanged_subset_skips_write() {
    let repo = Arc::new(RecordingRepository::default());
    let store = AppStateStore::restore(repo.clone()).await;

    store.set_theme(Theme::System).await.expect("no-op succeeds");
    assert!(repo.writes().is_empty());

    store.set_theme(Theme::Dark).await.expect("theme saved");
    assert!(repo.writes().contains(&keys::THEME.to_string()));
}

#[tokio::test]
async fn test_active_space_moves_view_space() {
    let repo = Arc::new(RecordingRepository::default());
    let store = AppStateStore::restore(repo.clone()).await;
    let work = Uuid::new_v4();
    let personal = Uuid::new_v4();

    store.set_view_space(Some(personal));
    store.set_active_space(Some(work)).await.expect("saved");

    let state = store.state();
    assert_eq!(state.active_space_id, Some(work));
    assert_eq!(state.view_space_id, Some(work));
    assert_eq!(
        repo.get(keys::ACTIVE_SPACE_ID).await.expect("readable"),
        Some(work.to_string())
    );

    store.set_active_space(None).await.expect("cleared");
    assert_eq!(repo.get(keys::ACTIVE_SPACE_ID).await.expect("readable"), None);
}

#[tokio::test]
async fn test_state_survives_restart_through_json_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("settings.json");
    let space = Uuid::new_v4();

    {
        let repo = Arc::new(JsonFileSettingsRepository::open(&path).await.expect("open"));
        let store = AppStateStore::restore(repo).await;
        store.set_active_space(Some(space)).await.expect("space saved");
        store.set_theme(Theme::Light).await.expect("theme saved");
        store.toggle_sidebar().await.expect("sidebar saved");
        store.navigate(Page::Settings);
    }

    let raw: BTreeMap<String, String> =
        serde_json::from_slice(&std::fs::read(&path).expect("file written")).expect("json object");
    assert_eq!(
        raw.keys().cloned().collect::<Vec<_>>(),
        vec![
            keys::ACTIVE_SPACE_ID.to_string(),
            keys::SIDEBAR_COLLAPSED.to_string(),
            keys::THEME.to_string(),
        ]
    );
    assert_eq!(raw.get(keys::THEME).map(String::as_str), Some("light"));
    assert_eq!(raw.get(keys::SIDEBAR_COLLAPSED).map(String::as_str), Some("true"));

    let repo = Arc::new(JsonFileSettingsRepository::open(&path).await.expect("reopen"));
    let store = AppStateStore::restore(repo).await;
    let state = store.state();
    assert_eq!(state.active_space_id, Some(space));
    assert_eq!(state.view_space_id, Some(space));
    assert_eq!(state.theme, Theme::Light);
    assert!(state.sidebar_collapsed);
    assert_eq!(state.navigation, Page::Dashboard);
}

#[tokio::test]
async fn test_unparsable_values_fall_back_to_defaults() {
    let repo = Arc::new(RecordingRepository::default());
    repo.set(keys::THEME, "neon").await.expect("seeded");
    repo.set(keys::ACTIVE_SPACE_ID, "not-a-uuid").await.expect("seeded");

    let store = AppStateStore::restore(repo).await;

    let state = store.state();
    assert_eq!(state.theme, Theme::System);
    assert_eq!(state.active_space_id, None);
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let store = AppStateStore::restore(Arc::new(RecordingRepository::read_only())).await;

    let err = store.set_theme(Theme::Dark).await.unwrap_err();

    assert!(matches!(err, ClientError::Settings { ref key, .. } if key == keys::THEME));
    assert_eq!(store.state().theme, Theme::System);
}

#[tokio::test]
async fn test_failed_space_write_restores_view_space() {
    let store = AppStateStore::restore(Arc::new(RecordingRepository::read_only())).await;
    let personal = Uuid::new_v4();
    store.set_view_space(Some(personal));
    store.navigate(Page::Registry);

    let err = store.set_active_space(Some(Uuid::new_v4())).await.unwrap_err();

    assert!(matches!(err, ClientError::Settings { ref key, .. } if key == keys::ACTIVE_SPACE_ID));
    let state = store.state();
    assert_eq!(state.active_space_id, None);
    assert_eq!(state.view_space_id, Some(personal));
    assert_eq!(state.navigation, Page::Registry);
}
