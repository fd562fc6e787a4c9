//! Application-level UI state
//!
//! Only [`PersistedAppState`] reaches storage. Everything else in
//! [`AppState`] is rebuilt at startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// Setting keys, dot-namespaced under `ui.`
pub mod keys {
    pub const ACTIVE_SPACE_ID: &str = "ui.active_space_id";
    pub const THEME: &str = "ui.theme";
    pub const SIDEBAR_COLLAPSED: &str = "ui.sidebar_collapsed";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Top-level page currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Dashboard,
    Registry,
    Servers,
    Spaces,
    FeatureSets,
    Clients,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    /// Space the gateway routes to
    pub active_space_id: Option<Uuid>,
    /// Space the UI is currently showing; may differ from the active one
    pub view_space_id: Option<Uuid>,
    pub theme: Theme,
    pub sidebar_collapsed: bool,
    pub navigation: Page,
}

/// The subset of [`AppState`] written to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistedAppState {
    pub active_space_id: Option<Uuid>,
    pub theme: Theme,
    pub sidebar_collapsed: bool,
}

impl From<&AppState> for PersistedAppState {
    fn from(state: &AppState) -> Self {
        Self {
            active_space_id: state.active_space_id,
            theme: state.theme,
            sidebar_collapsed: state.sidebar_collapsed,
        }
    }
}

impl PersistedAppState {
    /// Rebuild the full state; transient fields start from defaults and
    /// the viewed space starts at the active space.
    pub fn into_app_state(self) -> AppState {
        AppState {
            active_space_id: self.active_space_id,
            view_space_id: self.active_space_id,
            theme: self.theme,
            sidebar_collapsed: self.sidebar_collapsed,
            navigation: Page::default(),
        }
    }

    pub async fn load(repository: &dyn SettingsRepository) -> Self {
        Self {
            active_space_id: get_typed(repository, keys::ACTIVE_SPACE_ID).await,
            theme: get_typed(repository, keys::THEME).await.unwrap_or_default(),
            sidebar_collapsed: get_typed(repository, keys::SIDEBAR_COLLAPSED)
                .await
                .unwrap_or_default(),
        }
    }

    pub async fn save(&self, repository: &dyn SettingsRepository) -> ClientResult<()> {
        match self.active_space_id {
            Some(space_id) => set_typed(repository, keys::ACTIVE_SPACE_ID, &space_id).await?,
            None => repository
                .delete(keys::ACTIVE_SPACE_ID)
                .await
                .map_err(|e| settings_error(keys::ACTIVE_SPACE_ID, &e))?,
        }
        set_typed(repository, keys::THEME, &self.theme).await?;
        set_typed(repository, keys::SIDEBAR_COLLAPSED, &self.sidebar_collapsed).await
    }
}

/// Key/value settings storage
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Insert or update
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;

    /// All settings, sorted by key
    async fn list(&self) -> anyhow::Result<Vec<(String, String)>>;
}

fn settings_error(key: &str, err: &anyhow::Error) -> ClientError {
    ClientError::Settings {
        key: key.to_string(),
        message: format!("{err:#}"),
    }
}

/// Read a JSON-encoded value; bare strings are accepted unquoted
async fn get_typed<T: DeserializeOwned>(repository: &dyn SettingsRepository, key: &str) -> Option<T> {
    match repository.get(key).await {
        Ok(Some(raw)) => serde_json::from_str(&raw)
            .or_else(|_| serde_json::from_value(serde_json::Value::String(raw.clone())))
            .inspect_err(|e| warn!(key, value = %raw, error = %e, "[AppState] Ignoring unparsable setting"))
            .ok(),
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "[AppState] Failed to read setting");
            None
        }
    }
}

/// Write a JSON-encoded value; plain strings are stored unquoted
async fn set_typed<T: Serialize>(
    repository: &dyn SettingsRepository,
    key: &str,
    value: &T,
) -> ClientResult<()> {
    let encoded = match serde_json::to_value(value)? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };
    repository
        .set(key, &encoded)
        .await
        .map_err(|e| settings_error(key, &e))
}

/// Settings stored as one JSON object in a file.
///
/// The whole file is rewritten on every change.
pub struct JsonFileSettingsRepository {
    path: PathBuf,
    data: tokio::sync::Mutex<BTreeMap<String, String>>,
}

impl JsonFileSettingsRepository {
    /// Open `path`, starting empty if the file does not exist yet
    pub async fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "[AppState] Settings file opened");
        Ok(Self {
            path,
            data: tokio::sync::Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, data: &BTreeMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(data)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for JsonFileSettingsRepository {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next).await?;
        *data = next;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut data = self.data.lock().await;
        if !data.contains_key(key) {
            return Ok(());
        }
        let mut next = data.clone();
        next.remove(key);
        self.flush(&next).await?;
        *data = next;
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        Ok(self
            .data
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// [`AppState`] with write-through persistence of its persisted subset
pub struct AppStateStore {
    repository: Arc<dyn SettingsRepository>,
    state: RwLock<AppState>,
}

impl AppStateStore {
    /// Rebuild state from storage
    pub async fn restore(repository: Arc<dyn SettingsRepository>) -> Self {
        let persisted = PersistedAppState::load(repository.as_ref()).await;
        info!(
            active_space_id = ?persisted.active_space_id,
            theme = ?persisted.theme,
            "[AppState] Restored"
        );
        Self {
            state: RwLock::new(persisted.into_app_state()),
            repository,
        }
    }

    pub fn state(&self) -> AppState {
        self.state.read().clone()
    }

    /// Set the active space. The view follows it.
    pub async fn set_active_space(&self, space_id: Option<Uuid>) -> ClientResult<()> {
        self.update(|state| {
            state.active_space_id = space_id;
            state.view_space_id = space_id;
        })
        .await
    }

    /// Show another space without changing the active one. Not persisted.
    pub fn set_view_space(&self, space_id: Option<Uuid>) {
        self.state.write().view_space_id = space_id;
    }

    pub async fn set_theme(&self, theme: Theme) -> ClientResult<()> {
        self.update(|state| state.theme = theme).await
    }

    pub async fn set_sidebar_collapsed(&self, collapsed: bool) -> ClientResult<()> {
        self.update(|state| state.sidebar_collapsed = collapsed).await
    }

    pub async fn toggle_sidebar(&self) -> ClientResult<()> {
        self.update(|state| state.sidebar_collapsed = !state.sidebar_collapsed)
            .await
    }

    /// Not persisted
    pub fn navigate(&self, page: Page) {
        self.state.write().navigation = page;
    }

    /// Apply `change` and write the persisted subset if it changed. A
    /// failed write rolls the change back.
    async fn update(&self, change: impl FnOnce(&mut AppState)) -> ClientResult<()> {
        let (previous, after) = {
            let mut state = self.state.write();
            let previous = state.clone();
            change(&mut *state);
            (previous, PersistedAppState::from(&*state))
        };
        if PersistedAppState::from(&previous) == after {
            return Ok(());
        }

        let result = after.save(self.repository.as_ref()).await;
        if let Err(e) = &result {
            let mut state = self.state.write();
            // Leave a newer change alone
            if PersistedAppState::from(&*state) == after {
                warn!(error = %e, "[AppState] Write failed, restoring previous state");
                state.active_space_id = previous.active_space_id;
                state.view_space_id = previous.view_space_id;
                state.theme = previous.theme;
                state.sidebar_collapsed = previous.sidebar_collapsed;
            }
        }
        result
    }
}
