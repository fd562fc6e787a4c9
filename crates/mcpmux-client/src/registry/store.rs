//! Registry Store
//!
//! Holds the catalog, the installed servers of one space, and the user's
//! search/filter/sort selection. The display list is derived on demand.

use std::collections::HashSet;
use std::sync::Arc;

use mcpmux_core::{channels, InstalledServer, ServerChangedPayload, ServerDefinition, UiConfig};
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::filter::{apply_filters_and_sort, page_count, paginate, ActiveFilters, ALL_OPTION};
use super::view_model::{merge, ServerViewModel};
use crate::bridge::{names, CommandResult, RegistryCommands, ServerInputs};
use crate::error::{ClientError, ClientResult};
use crate::events::{EventHub, Subscription};
use crate::notify::Notifier;

/// Snapshot of everything the registry page renders from
#[derive(Debug, Clone)]
pub struct RegistryState {
    pub space_id: Option<Uuid>,
    pub definitions: Vec<ServerDefinition>,
    pub installed: Vec<InstalledServer>,
    pub ui_config: UiConfig,
    pub featured_ids: Vec<String>,
    /// Catalog served from cache, or unreachable
    pub offline: bool,
    pub active_filters: ActiveFilters,
    pub active_sort: String,
    pub search_query: String,
    /// 1-based
    pub current_page: u32,
    pub loading: bool,
    pub error: Option<String>,
    /// Server ids with a mutation in flight
    pub pending: HashSet<String>,
    /// Bumped by every `load`
    load_generation: u64,
    /// Bumped by every fetch of the installed list
    installed_generation: u64,
}

impl Default for RegistryState {
    fn default() -> Self {
        let ui_config = UiConfig::default();
        Self {
            space_id: None,
            definitions: Vec::new(),
            installed: Vec::new(),
            active_sort: ui_config.default_sort.clone(),
            ui_config,
            featured_ids: Vec::new(),
            offline: false,
            active_filters: ActiveFilters::new(),
            search_query: String::new(),
            current_page: 1,
            loading: false,
            error: None,
            pending: HashSet::new(),
            load_generation: 0,
            installed_generation: 0,
        }
    }
}

impl RegistryState {
    pub fn view_models(&self) -> Vec<ServerViewModel> {
        merge(&self.definitions, &self.installed)
    }

    pub fn display(&self) -> Vec<ServerViewModel> {
        apply_filters_and_sort(
            &self.view_models(),
            &self.ui_config,
            &self.active_filters,
            &self.active_sort,
            &self.search_query,
        )
    }

    fn server_name(&self, server_id: &str) -> String {
        self.definitions
            .iter()
            .find(|d| d.id == server_id)
            .map(|d| d.name.clone())
            .or_else(|| {
                self.installed
                    .iter()
                    .find(|s| s.server_id == server_id)
                    .map(|s| s.display_name().to_string())
            })
            .unwrap_or_else(|| server_id.to_string())
    }
}

/// Registry page state for one space at a time
pub struct RegistryStore {
    commands: Arc<dyn RegistryCommands>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<RegistryState>,
}

impl RegistryStore {
    pub fn new(commands: Arc<dyn RegistryCommands>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            commands,
            notifier,
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Load catalog, UI config and installed servers for `space_id`.
    ///
    /// A catalog failure does not block the page: installed servers are
    /// still shown through their cached definitions. A load that finishes
    /// after a newer load is discarded, and its installed list is dropped
    /// when a newer refresh started in the meantime.
    pub async fn load(&self, space_id: Uuid) {
        let (load_generation, installed_generation) = {
            let mut state = self.state.write();
            if state.space_id != Some(space_id) {
                state.installed.clear();
                state.pending.clear();
            }
            state.space_id = Some(space_id);
            state.loading = true;
            state.error = None;
            state.load_generation += 1;
            state.installed_generation += 1;
            (state.load_generation, state.installed_generation)
        };

        let ui_config = self
            .commands
            .get_registry_ui_config()
            .await
            .inspect_err(|e| warn!(error = %e, "[RegistryStore] UI config unavailable, keeping current"))
            .ok();
        let featured_ids = match self.commands.get_registry_home_config().await {
            Ok(home) => home.map(|h| h.featured_server_ids).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "[RegistryStore] Home config unavailable");
                Vec::new()
            }
        };
        let catalog = self.commands.discover_servers().await;
        let backend_offline = self.commands.is_registry_offline().await.unwrap_or_else(|e| {
            warn!(error = %e, "[RegistryStore] Offline flag unavailable");
            false
        });
        let installed = self.commands.list_installed_servers(space_id).await;

        let mut state = self.state.write();
        if state.load_generation != load_generation {
            debug!(space_id = %space_id, "[RegistryStore] Discarding superseded load");
            return;
        }

        if let Some(config) = ui_config {
            if config.sort_option(&state.active_sort).is_none() {
                state.active_sort = config.default_sort.clone();
            }
            state.ui_config = config;
        }
        state.featured_ids = featured_ids;

        match catalog {
            Ok(definitions) => {
                state.definitions = definitions;
                state.offline = backend_offline;
            }
            Err(e) => {
                warn!(error = %e, "[RegistryStore] Catalog unavailable, showing installed servers only");
                state.definitions.clear();
                state.offline = true;
                state.error = Some(format!("Failed to load registry: {e:#}"));
            }
        }

        match installed {
            _ if state.installed_generation != installed_generation => {
                debug!(space_id = %space_id, "[RegistryStore] Keeping newer installed list");
            }
            Ok(list) => state.installed = list,
            Err(e) => {
                warn!(error = %e, "[RegistryStore] Installed servers unavailable");
                state
                    .error
                    .get_or_insert_with(|| format!("Failed to load installed servers: {e:#}"));
            }
        }

        state.loading = false;
        info!(
            space_id = %space_id,
            definitions = state.definitions.len(),
            installed = state.installed.len(),
            offline = state.offline,
            "[RegistryStore] Loaded"
        );
    }

    /// Select an option for a filter. Clears the search query.
    pub fn select_filter(&self, filter_id: &str, option_id: &str) {
        let mut state = self.state.write();
        if option_id == ALL_OPTION {
            state.active_filters.remove(filter_id);
        } else {
            state
                .active_filters
                .insert(filter_id.to_string(), option_id.to_string());
        }
        state.search_query.clear();
        state.current_page = 1;
    }

    /// Set the search query. Active filters are kept.
    pub fn set_search(&self, query: &str) {
        let mut state = self.state.write();
        state.search_query = query.to_string();
        state.current_page = 1;
    }

    pub fn set_sort(&self, sort_id: &str) {
        let mut state = self.state.write();
        state.active_sort = sort_id.to_string();
        state.current_page = 1;
    }

    pub fn clear_filters(&self) {
        let mut state = self.state.write();
        state.active_filters.clear();
        state.current_page = 1;
    }

    /// Jump to a 1-based page, clamped to the available range
    pub fn set_page(&self, page: u32) {
        let mut state = self.state.write();
        let total = state.display().len();
        let last = page_count(total, state.ui_config.items_per_page);
        state.current_page = page.clamp(1, last);
    }

    pub fn dismiss_error(&self) {
        self.state.write().error = None;
    }

    pub fn state(&self) -> RegistryState {
        self.state.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn is_offline(&self) -> bool {
        self.state.read().offline
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn is_pending(&self, server_id: &str) -> bool {
        self.state.read().pending.contains(server_id)
    }

    /// Merged, unfiltered view models
    pub fn view_models(&self) -> Vec<ServerViewModel> {
        self.state.read().view_models()
    }

    /// Searched, filtered and sorted view models
    pub fn display(&self) -> Vec<ServerViewModel> {
        self.state.read().display()
    }

    /// The current page of [`display`](Self::display)
    pub fn page(&self) -> Vec<ServerViewModel> {
        let state = self.state.read();
        let display = state.display();
        paginate(&display, state.current_page, state.ui_config.items_per_page).to_vec()
    }

    pub fn page_count(&self) -> u32 {
        let state = self.state.read();
        page_count(state.display().len(), state.ui_config.items_per_page)
    }

    /// Featured servers in configured order; unknown ids are skipped
    pub fn featured(&self) -> Vec<ServerViewModel> {
        let state = self.state.read();
        let view_models = state.view_models();
        state
            .featured_ids
            .iter()
            .filter_map(|id| view_models.iter().find(|vm| vm.id() == id).cloned())
            .collect()
    }

    pub async fn install(&self, server_id: &str) -> ClientResult<()> {
        let space_id = self.begin_mutation(server_id)?;
        let result = self
            .commands
            .install_server(server_id, space_id)
            .await
            .map(|_| ());
        self.finish_mutation(server_id, space_id, names::INSTALL_SERVER, result, "Installed")
            .await
    }

    pub async fn uninstall(&self, server_id: &str) -> ClientResult<()> {
        let space_id = self.begin_mutation(server_id)?;
        let result = self.commands.uninstall_server(server_id, space_id).await;
        self.finish_mutation(server_id, space_id, names::UNINSTALL_SERVER, result, "Uninstalled")
            .await
    }

    /// Toggle the persisted enabled flag without touching the connection
    pub async fn set_enabled(&self, server_id: &str, enabled: bool) -> ClientResult<()> {
        let space_id = self.begin_mutation(server_id)?;
        let result = self
            .commands
            .set_server_enabled(server_id, enabled, space_id)
            .await;
        let verb = if enabled { "Enabled" } else { "Disabled" };
        self.finish_mutation(server_id, space_id, names::SET_SERVER_ENABLED, result, verb)
            .await
    }

    pub async fn save_inputs(&self, server_id: &str, inputs: ServerInputs) -> ClientResult<()> {
        let space_id = self.begin_mutation(server_id)?;
        let result = self
            .commands
            .save_server_inputs(server_id, space_id, inputs)
            .await
            .map(|_| ());
        self.finish_mutation(
            server_id,
            space_id,
            names::SAVE_SERVER_INPUTS,
            result,
            "Saved configuration for",
        )
        .await
    }

    /// Refresh the installed list whenever the backend reports a lifecycle
    /// change for the loaded space. The listener holds the store weakly.
    pub fn watch_server_changes(self: &Arc<Self>, hub: &EventHub) -> Subscription {
        let store = Arc::downgrade(self);
        hub.listen::<ServerChangedPayload, _>(channels::SERVER_CHANGED, move |event| {
            let Some(store) = store.upgrade() else {
                return;
            };
            if store.state.read().space_id != Some(event.space_id) {
                return;
            }
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                warn!(server_id = %event.server_id, "[RegistryStore] No runtime, skipping refresh");
                return;
            };
            debug!(
                server_id = %event.server_id,
                action = ?event.action,
                "[RegistryStore] Server changed, refreshing installed servers"
            );
            runtime.spawn(async move { store.refresh_installed().await });
        })
    }

    /// Re-fetch only the installed list (after a mutation or a
    /// `server-changed` event)
    pub async fn refresh_installed(&self) {
        let (space_id, generation) = {
            let mut state = self.state.write();
            let Some(space_id) = state.space_id else {
                return;
            };
            state.installed_generation += 1;
            (space_id, state.installed_generation)
        };
        let result = self.commands.list_installed_servers(space_id).await;

        let mut state = self.state.write();
        if state.installed_generation != generation {
            debug!(space_id = %space_id, "[RegistryStore] Discarding superseded refresh");
            return;
        }
        match result {
            Ok(list) => state.installed = list,
            Err(e) => {
                warn!(error = %e, "[RegistryStore] Failed to refresh installed servers");
                state.error = Some(format!("Failed to load installed servers: {e:#}"));
            }
        }
    }

    fn begin_mutation(&self, server_id: &str) -> ClientResult<Uuid> {
        let mut state = self.state.write();
        let space_id = state.space_id.ok_or(ClientError::NotAttached)?;
        state.pending.insert(server_id.to_string());
        Ok(space_id)
    }

    async fn finish_mutation(
        &self,
        server_id: &str,
        space_id: Uuid,
        command: &'static str,
        result: CommandResult<()>,
        verb: &str,
    ) -> ClientResult<()> {
        let name = {
            let mut state = self.state.write();
            state.pending.remove(server_id);
            state.server_name(server_id)
        };

        match result {
            Ok(()) => {
                info!(server_id, space_id = %space_id, command, "[RegistryStore] Mutation accepted");
                self.notifier.success(&format!("{verb} {name}"));
                self.refresh_installed().await;
                Ok(())
            }
            Err(e) => {
                warn!(server_id, command, error = %e, "[RegistryStore] Mutation failed");
                self.notifier.error(&format!("{command} failed for {name}: {e:#}"));
                Err(ClientError::command(command, &e))
            }
        }
    }
}
