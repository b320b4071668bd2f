//! # Engine Wiring
//!
//! `SyncEngine` assembles the four subsystems over the production adapters
//! and exposes the operational facade: event ingestion, stock queries,
//! dead-letter operations, and reconciliation triggers.
//!
//! The engine is generic over the storefront client so tests can inject a
//! scripted remote; production uses `RestStorefrontClient`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use mesh_ledger::{
    LedgerConfig, LedgerError, LedgerService, LineResult, MutationOutcome, Product, StockRecord,
    StockMutationApi, StockQueryApi,
};
use mesh_mapping::{MappingApi, MappingService, RemoteCatalog};
use mesh_propagation::{
    DeadLetterApi, PropagationApi, PropagationDispatcher, PropagationError, PropagationFailure,
    RemoteStockWriter,
};
use mesh_reconcile::{ReconcileApi, ReconcileError, ReconcileReport, ReconcileService};
use shared_types::{EventKind, LineItem, NormalizedEvent, SiteId, Sku};

use crate::adapters::{
    ConfigSiteDirectory, DataDirLock, DispatcherResync, LedgerProductSink, LedgerStockReader,
    MappingIndexAdapter, MappingRefresherAdapter, MappingResolveAdapter, RocksDbConfig,
    RocksDbFailureStore, RocksDbMappingRepository, RocksDbStore, SystemClock,
};
use crate::config::RuntimeConfig;
use crate::settings::{EngineSettings, SettingsHandle};

pub type MeshLedger = LedgerService<RocksDbStore, SystemClock>;
pub type MeshMapping<X> = MappingService<X, RocksDbMappingRepository, LedgerProductSink, SystemClock>;
pub type MeshDispatcher<X> = PropagationDispatcher<
    X,
    LedgerStockReader,
    MappingResolveAdapter,
    ConfigSiteDirectory,
    RocksDbFailureStore,
    SystemClock,
>;
pub type MeshReconciler =
    ReconcileService<MappingRefresherAdapter, MappingIndexAdapter, DispatcherResync, ConfigSiteDirectory>;

/// The assembled engine.
pub struct SyncEngine<X>
where
    X: RemoteStockWriter + RemoteCatalog + Clone + 'static,
{
    config: RuntimeConfig,
    settings: Arc<SettingsHandle>,
    ledger: Arc<MeshLedger>,
    mapping: Arc<MeshMapping<X>>,
    dispatcher: Arc<MeshDispatcher<X>>,
    reconciler: Arc<MeshReconciler>,
    /// Held for the engine's lifetime; the in-process SKU locks are only
    /// sound while this process is the sole owner of the data directory.
    _lock: DataDirLock,
}

impl<X> SyncEngine<X>
where
    X: RemoteStockWriter + RemoteCatalog + Clone + 'static,
{
    /// Open the store and wire every subsystem.
    pub fn new(config: RuntimeConfig, storefront: X) -> anyhow::Result<Arc<Self>> {
        let lock = DataDirLock::acquire(&config.data_dir)
            .context("failed to lock data directory")?;

        let store = RocksDbStore::open(RocksDbConfig {
            path: config.data_dir.join("db"),
            ..Default::default()
        })
        .context("failed to open store")?;

        let settings = Arc::new(SettingsHandle::new(config.settings.clone()));
        let ledger_config = LedgerConfig {
            lock_timeout_ms: config.ledger.lock_timeout_ms,
            default_backorders: settings.snapshot().backorders_default,
        };

        let ledger: Arc<MeshLedger> =
            Arc::new(LedgerService::new(store.clone(), SystemClock, ledger_config));

        let mapping: Arc<MeshMapping<X>> = Arc::new(MappingService::new(
            storefront.clone(),
            RocksDbMappingRepository::new(store.clone()),
            LedgerProductSink(ledger.clone()),
            SystemClock,
        ));

        let directory = ConfigSiteDirectory::new(config.sites.clone());

        let dispatcher: Arc<MeshDispatcher<X>> = Arc::new(PropagationDispatcher::new(
            config.propagation.clone(),
            Arc::new(storefront),
            Arc::new(LedgerStockReader(ledger.clone())),
            Arc::new(MappingResolveAdapter(mapping.clone())),
            Arc::new(directory.clone()),
            Arc::new(RocksDbFailureStore::new(store)),
            Arc::new(SystemClock),
        ));

        let reconciler = Arc::new(ReconcileService::new(
            MappingRefresherAdapter(mapping.clone()),
            MappingIndexAdapter(mapping.clone()),
            DispatcherResync {
                dispatcher: dispatcher.clone(),
                stock: ledger.clone(),
            },
            directory,
        ));

        info!(
            sites = config.sites.len(),
            workers = config.propagation.workers,
            "engine assembled"
        );

        Ok(Arc::new(Self {
            config,
            settings,
            ledger,
            mapping,
            dispatcher,
            reconciler,
            _lock: lock,
        }))
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Start the propagation worker pool.
    pub fn spawn_workers(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        self.dispatcher.spawn_workers()
    }

    /// Start the periodic full reconciliation, when configured.
    pub fn spawn_reconcile_scheduler(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let secs = self.config.reconcile_interval_secs;
        if secs == 0 {
            return None;
        }
        let push_stock = self.config.reconcile_push_stock;
        let engine = Arc::clone(self);

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; reconciliation at boot is
            // the crash-recovery path, so take it.
            loop {
                interval.tick().await;
                let reports = engine.reconcile_all(push_stock).await;
                info!(sites = reports.len(), "scheduled reconciliation finished");
            }
        }))
    }

    /// Stop accepting propagation tasks; workers drain and exit.
    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
    }

    // =========================================================================
    // EVENT INGESTION
    // =========================================================================

    /// Apply one normalized event and fan out on success.
    ///
    /// Ledger errors bubble: the source-of-truth write did not happen and
    /// the upstream sender must redeliver. Propagation problems are
    /// absorbed here; the mutation already committed, and reconciliation
    /// heals whatever the queue drops.
    pub fn handle_event(&self, event: &NormalizedEvent) -> Result<MutationOutcome, LedgerError> {
        let outcome = self.ledger.apply_event(event)?;
        if outcome.applied {
            self.fan_out(&event.site_id, &event.sku, outcome.new_on_hand);
        }
        Ok(outcome)
    }

    /// Apply every line of an order and fan out the newly applied ones.
    pub fn handle_order(
        &self,
        site_id: &SiteId,
        order_id: &str,
        lines: &[LineItem],
        kind: EventKind,
    ) -> Result<Vec<LineResult>, LedgerError> {
        let results = self.ledger.apply_order(site_id, order_id, lines, kind)?;
        for line in results.iter().filter(|l| l.applied) {
            self.fan_out(site_id, &line.sku, line.new_on_hand);
        }
        Ok(results)
    }

    fn fan_out(&self, origin: &SiteId, sku: &Sku, quantity: i64) {
        if let Err(e) = self.dispatcher.enqueue_fanout(origin, sku, quantity) {
            warn!(
                sku = %sku,
                origin = %origin,
                error = %e,
                "fan-out not enqueued; reconciliation will resync"
            );
        }
    }

    // =========================================================================
    // OPERATIONAL FACADE
    // =========================================================================

    pub fn on_hand(&self, sku: &Sku) -> Result<Option<i64>, LedgerError> {
        self.ledger.on_hand(sku)
    }

    pub fn stock(&self, sku: &Sku) -> Result<Option<StockRecord>, LedgerError> {
        self.ledger.stock(sku)
    }

    pub fn all_stock(&self) -> Result<Vec<StockRecord>, LedgerError> {
        self.ledger.all_stock()
    }

    pub fn product(&self, sku: &Sku) -> Result<Option<Product>, LedgerError> {
        self.ledger.product(sku)
    }

    pub fn dead_letters(&self) -> Result<Vec<PropagationFailure>, PropagationError> {
        self.dispatcher.failures()
    }

    pub fn retry_dead_letter(&self, id: &Uuid) -> Result<(), PropagationError> {
        self.dispatcher.retry_failure(id)
    }

    pub fn purge_dead_letter(&self, id: &Uuid) -> Result<(), PropagationError> {
        self.dispatcher.purge_failure(id)
    }

    pub async fn reconcile(
        &self,
        site_id: &SiteId,
        push_stock: bool,
    ) -> Result<ReconcileReport, ReconcileError> {
        self.reconciler.reconcile(site_id, push_stock).await
    }

    pub async fn reconcile_all(&self, push_stock: bool) -> Vec<ReconcileReport> {
        self.reconciler.reconcile_all(push_stock).await
    }

    pub fn mappings_for(
        &self,
        site_id: &SiteId,
    ) -> Result<Vec<mesh_mapping::SiteMapping>, mesh_mapping::MappingError> {
        self.mapping.mappings_for(site_id)
    }

    pub fn settings(&self) -> Arc<EngineSettings> {
        self.settings.snapshot()
    }

    /// Swap the settings snapshot; returns the new version.
    pub fn update_settings(&self, settings: EngineSettings) -> u64 {
        self.settings.update(settings)
    }
}
