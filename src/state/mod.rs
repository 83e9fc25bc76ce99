pub mod event;
pub mod grouping;
pub mod lifecycle;
pub mod player;
pub mod queue;

use std::sync::Arc;

use dashmap::DashMap;
use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        audit_store::AuditStore,
        registry::{EventRegistry, InMemoryEventRegistry},
    },
    error::ServiceError,
};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state holding the event registry, the audit store
/// slot, and the shared random source.
pub struct AppState {
    audit_store: RwLock<Option<Arc<dyn AuditStore>>>,
    registry: Arc<dyn EventRegistry>,
    degraded: watch::Sender<bool>,
    event_gates: DashMap<Uuid, Arc<Mutex<()>>>,
    rng: Mutex<StdRng>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned
    /// cheaply.
    ///
    /// The application starts in degraded mode until an audit store is
    /// installed. The random source is seeded from the operating system.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Construct the state with an explicit random source so matchmaking
    /// outcomes are reproducible.
    pub fn with_rng(config: AppConfig, rng: StdRng) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            audit_store: RwLock::new(None),
            registry: Arc::new(InMemoryEventRegistry::new()),
            degraded: degraded_tx,
            event_gates: DashMap::new(),
            rng: Mutex::new(rng),
            config,
        })
    }

    /// Obtain a handle to the current audit store, if one is installed.
    pub async fn audit_store(&self) -> Option<Arc<dyn AuditStore>> {
        let guard = self.audit_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the audit store or fail with the degraded-mode error.
    pub async fn require_audit_store(&self) -> Result<Arc<dyn AuditStore>, ServiceError> {
        self.audit_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new audit store implementation and leave degraded mode.
    pub async fn install_audit_store(&self, store: Arc<dyn AuditStore>) {
        {
            let mut guard = self.audit_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current audit store and enter degraded mode.
    pub async fn clear_audit_store(&self) {
        {
            let mut guard = self.audit_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.audit_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        if self.is_degraded().await == value {
            return;
        }

        let _ = self.degraded.send(value);
    }

    /// The injected event registry.
    pub fn registry(&self) -> &Arc<dyn EventRegistry> {
        &self.registry
    }

    /// Per-event write gate serializing mutating calls for one event id.
    ///
    /// The engine assumes single-writer-per-event; this gate is the calling
    /// layer's side of that contract.
    pub fn event_gate(&self, event_id: Uuid) -> Arc<Mutex<()>> {
        self.event_gates
            .entry(event_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the write gate of a closed event.
    pub fn drop_event_gate(&self, event_id: Uuid) {
        self.event_gates.remove(&event_id);
    }

    /// Shared random source used for group fill.
    pub fn rng(&self) -> &Mutex<StdRng> {
        &self.rng
    }

    /// Engine limits loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
