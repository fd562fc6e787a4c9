//! Connection Store
//!
//! Per-space mirror of backend connection status, fed by an initial
//! snapshot and then by push events.
//!
//! # Acceptance rule
//!
//! A status event for server E is applied only when its `space_id` is the
//! bound space and its `flow_id` is not older than the stored one. Stale
//! events from superseded connection attempts are dropped silently.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mcpmux_core::{
    channels, ConnectionStatus, ServerAuthProgressPayload, ServerFeaturesUpdatedPayload,
    ServerStatusChangedPayload, ServerStatusResponse,
};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bridge::{names, ConnectionCommands};
use crate::error::{ClientError, ClientResult};
use crate::events::{EventHub, Subscription};
use crate::notify::Notifier;

/// Everything the store knows about the bound space
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    space_id: Option<Uuid>,
    /// Bumped on every attach/detach; fetches started under an older
    /// generation are discarded
    generation: u64,
    records: HashMap<String, ServerStatusResponse>,
    auth_remaining: HashMap<String, u64>,
    features: HashMap<String, ServerFeaturesUpdatedPayload>,
    expanded: HashSet<String>,
    pending: HashSet<String>,
    loading: bool,
    error: Option<String>,
}

impl ConnectionState {
    /// Fresh state bound to `space_id`
    pub fn bound(space_id: Uuid) -> Self {
        Self {
            space_id: Some(space_id),
            ..Self::default()
        }
    }

    pub fn space_id(&self) -> Option<Uuid> {
        self.space_id
    }

    pub fn records(&self) -> &HashMap<String, ServerStatusResponse> {
        &self.records
    }

    /// Records as reported to readers: none until the snapshot resolves.
    /// Events accepted meanwhile are merged but stay hidden.
    pub fn visible_records(&self) -> Option<&HashMap<String, ServerStatusResponse>> {
        (!self.loading).then_some(&self.records)
    }

    fn is_bound_to(&self, space_id: Uuid) -> bool {
        self.space_id == Some(space_id)
    }

    /// Apply a status event. Returns whether it was accepted.
    pub fn accept_status(&mut self, event: &ServerStatusChangedPayload) -> bool {
        if !self.is_bound_to(event.space_id) {
            debug!(
                server_id = %event.server_id,
                event_space = %event.space_id,
                "[ConnectionStore] Ignoring status for another space"
            );
            return false;
        }

        let previous = self.records.get(&event.server_id);
        if let Some(previous) = previous {
            if event.flow_id < previous.flow_id {
                debug!(
                    server_id = %event.server_id,
                    flow_id = event.flow_id,
                    current_flow_id = previous.flow_id,
                    "[ConnectionStore] Ignoring stale status"
                );
                return false;
            }
        }

        let mut record = event.to_record();
        record.has_connected_before |= previous.is_some_and(|p| p.has_connected_before);

        if record.status != ConnectionStatus::Authenticating {
            self.auth_remaining.remove(&event.server_id);
        }

        debug!(
            server_id = %event.server_id,
            status = %record.status,
            flow_id = record.flow_id,
            "[ConnectionStore] Status accepted"
        );
        self.records.insert(event.server_id.clone(), record);
        true
    }

    /// Apply an auth countdown tick. Space-gated only.
    pub fn accept_auth_progress(&mut self, event: &ServerAuthProgressPayload) -> bool {
        if !self.is_bound_to(event.space_id) {
            return false;
        }
        self.auth_remaining
            .insert(event.server_id.clone(), event.remaining_seconds);
        true
    }

    /// Record discovered features and expand the server's feature section
    pub fn accept_features(&mut self, event: &ServerFeaturesUpdatedPayload) -> bool {
        if !self.is_bound_to(event.space_id) {
            return false;
        }
        debug!(
            server_id = %event.server_id,
            total = event.total_count(),
            "[ConnectionStore] Features updated"
        );
        self.expanded.insert(event.server_id.clone());
        self.features.insert(event.server_id.clone(), event.clone());
        true
    }

    /// Merge the initial snapshot. Records that already moved to a newer
    /// flow (an event beat the snapshot) are kept.
    pub fn apply_snapshot(&mut self, snapshot: HashMap<String, ServerStatusResponse>) {
        for (server_id, mut record) in snapshot {
            match self.records.get_mut(&server_id) {
                Some(current) if current.flow_id > record.flow_id => {
                    current.has_connected_before |= record.has_connected_before;
                }
                current => {
                    record.has_connected_before |=
                        current.is_some_and(|c| c.has_connected_before);
                    self.records.insert(server_id, record);
                }
            }
        }
    }
}

/// Requests a row can make; each maps to one backend command
#[derive(Debug, Clone, Copy)]
enum Request {
    Enable,
    Disable,
    Connect,
    Cancel,
    Retry,
}

impl Request {
    fn command(self) -> &'static str {
        match self {
            Self::Enable => names::ENABLE_SERVER,
            Self::Disable => names::DISABLE_SERVER,
            Self::Connect => names::START_AUTH,
            Self::Cancel => names::CANCEL_AUTH,
            Self::Retry => names::RETRY_CONNECTION,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Connect => "connect",
            Self::Cancel => "cancel authentication for",
            Self::Retry => "retry",
        }
    }
}

/// Event-driven connection state for one space at a time.
///
/// Actions are request/acknowledge: they never change a status locally,
/// the resulting status arrives as a `server-status-changed` event.
pub struct ConnectionStore {
    commands: Arc<dyn ConnectionCommands>,
    hub: EventHub,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<ConnectionState>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl ConnectionStore {
    pub fn new(
        commands: Arc<dyn ConnectionCommands>,
        hub: EventHub,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            commands,
            hub,
            notifier,
            state: Arc::new(RwLock::new(ConnectionState::default())),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Bind to `space_id`, discarding everything known about the previous
    /// space, then fetch the status snapshot.
    pub async fn attach(&self, space_id: Uuid) {
        let generation = {
            let mut state = self.state.write();
            let generation = state.generation.wrapping_add(1);
            *state = ConnectionState {
                generation,
                loading: true,
                ..ConnectionState::bound(space_id)
            };
            generation
        };
        self.subscribe();
        info!(space_id = %space_id, "[ConnectionStore] Attached");

        let snapshot = self.commands.get_server_statuses(space_id).await;

        let mut state = self.state.write();
        if state.generation != generation {
            debug!(space_id = %space_id, "[ConnectionStore] Discarding snapshot for previous binding");
            return;
        }
        state.loading = false;
        match snapshot {
            Ok(records) => {
                debug!(count = records.len(), "[ConnectionStore] Snapshot loaded");
                state.apply_snapshot(records);
            }
            Err(e) => {
                warn!(space_id = %space_id, error = %e, "[ConnectionStore] Snapshot failed");
                state.error = Some(format!("Failed to load server statuses: {e:#}"));
            }
        }
    }

    /// Unbind: drop subscriptions and all per-space state
    pub fn detach(&self) {
        self.subscriptions.lock().clear();
        let mut state = self.state.write();
        let generation = state.generation.wrapping_add(1);
        *state = ConnectionState {
            generation,
            ..ConnectionState::default()
        };
        info!("[ConnectionStore] Detached");
    }

    /// Replace any existing listeners with exactly one per channel
    fn subscribe(&self) {
        let mut subscriptions = self.subscriptions.lock();
        subscriptions.clear();

        let state = Arc::clone(&self.state);
        subscriptions.push(self.hub.listen::<ServerStatusChangedPayload, _>(
            channels::SERVER_STATUS_CHANGED,
            move |event| {
                state.write().accept_status(&event);
            },
        ));

        let state = Arc::clone(&self.state);
        subscriptions.push(self.hub.listen::<ServerAuthProgressPayload, _>(
            channels::SERVER_AUTH_PROGRESS,
            move |event| {
                state.write().accept_auth_progress(&event);
            },
        ));

        let state = Arc::clone(&self.state);
        subscriptions.push(self.hub.listen::<ServerFeaturesUpdatedPayload, _>(
            channels::SERVER_FEATURES_UPDATED,
            move |event| {
                state.write().accept_features(&event);
            },
        ));
    }

    pub async fn enable(&self, server_id: &str) -> ClientResult<()> {
        self.request(Request::Enable, server_id).await
    }

    pub async fn disable(&self, server_id: &str) -> ClientResult<()> {
        self.request(Request::Disable, server_id).await
    }

    /// Start (or restart) the OAuth flow
    pub async fn connect(&self, server_id: &str) -> ClientResult<()> {
        self.request(Request::Connect, server_id).await
    }

    /// Ask the backend to abort an in-flight OAuth flow
    pub async fn cancel(&self, server_id: &str) -> ClientResult<()> {
        self.request(Request::Cancel, server_id).await
    }

    /// Reconnect with stored credentials
    pub async fn retry(&self, server_id: &str) -> ClientResult<()> {
        self.request(Request::Retry, server_id).await
    }

    async fn request(&self, request: Request, server_id: &str) -> ClientResult<()> {
        let space_id = {
            let mut state = self.state.write();
            let space_id = state.space_id.ok_or(ClientError::NotAttached)?;
            state.pending.insert(server_id.to_string());
            space_id
        };

        let result = match request {
            Request::Enable => self.commands.enable_server(space_id, server_id).await,
            Request::Disable => self.commands.disable_server(space_id, server_id).await,
            Request::Connect => self.commands.start_auth(space_id, server_id).await,
            Request::Cancel => self.commands.cancel_auth(space_id, server_id).await,
            Request::Retry => self.commands.retry_connection(space_id, server_id).await,
        };

        {
            let mut state = self.state.write();
            if state.is_bound_to(space_id) {
                state.pending.remove(server_id);
            }
        }

        let command = request.command();
        match result {
            Ok(()) => {
                debug!(server_id, command, "[ConnectionStore] Request acknowledged");
                Ok(())
            }
            Err(e) => {
                warn!(server_id, command, error = %e, "[ConnectionStore] Request failed");
                self.notifier
                    .error(&format!("Failed to {} {server_id}: {e:#}", request.verb()));
                Err(ClientError::command(command, &e))
            }
        }
    }

    /// Hide the feature section expanded by a features-updated event
    pub fn collapse(&self, server_id: &str) {
        self.state.write().expanded.remove(server_id);
    }

    pub fn dismiss_error(&self) {
        self.state.write().error = None;
    }

    pub fn space_id(&self) -> Option<Uuid> {
        self.state.read().space_id
    }

    pub fn status(&self, server_id: &str) -> Option<ConnectionStatus> {
        self.record(server_id).map(|r| r.status)
    }

    pub fn record(&self, server_id: &str) -> Option<ServerStatusResponse> {
        self.state
            .read()
            .visible_records()
            .and_then(|records| records.get(server_id).cloned())
    }

    pub fn has_connected_before(&self, server_id: &str) -> bool {
        self.record(server_id).is_some_and(|r| r.has_connected_before)
    }

    /// Seconds left in the OAuth window, while authenticating
    pub fn auth_remaining(&self, server_id: &str) -> Option<u64> {
        self.state.read().auth_remaining.get(server_id).copied()
    }

    pub fn features(&self, server_id: &str) -> Option<ServerFeaturesUpdatedPayload> {
        self.state.read().features.get(server_id).cloned()
    }

    pub fn is_expanded(&self, server_id: &str) -> bool {
        self.state.read().expanded.contains(server_id)
    }

    pub fn is_pending(&self, server_id: &str) -> bool {
        self.state.read().pending.contains(server_id)
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// All status records, keyed by server id. Empty while loading.
    pub fn snapshot(&self) -> HashMap<String, ServerStatusResponse> {
        self.state
            .read()
            .visible_records()
            .cloned()
            .unwrap_or_default()
    }
}
