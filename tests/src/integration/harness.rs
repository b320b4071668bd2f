//! In-memory engine wiring shared by the integration tests.
//!
//! Mirrors the runtime's production wiring, with the storage and the
//! storefront replaced by in-memory doubles. The storefront double records
//! every push and can be scripted to fail.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use mesh_ledger::test_utils::{FixedClock, InMemoryStore};
use mesh_ledger::{LedgerConfig, LedgerService};
use mesh_mapping::test_utils::InMemoryMappingRepository;
use mesh_mapping::{
    MappingError, MappingService, ProductKind, RemoteCatalog, RemoteProduct, RemoteVariation,
};
use mesh_propagation::test_utils::InMemoryFailureStore;
use mesh_propagation::{
    PropagationConfig, PropagationDispatcher, PushError, RemoteStockWriter,
};
use mesh_reconcile::ReconcileService;
use mesh_runtime::adapters::{
    ConfigSiteDirectory, DispatcherResync, LedgerProductSink, LedgerStockReader,
    MappingIndexAdapter, MappingRefresherAdapter, MappingResolveAdapter,
};
use shared_types::{
    EventKind, NormalizedEvent, RemoteProductRef, Site, SiteId, Sku,
};

/// One recorded remote push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Push {
    pub site_id: SiteId,
    pub remote: RemoteProductRef,
    pub quantity: i64,
}

#[derive(Default)]
struct StorefrontInner {
    pushes: Mutex<Vec<Push>>,
    products: Mutex<Vec<RemoteProduct>>,
    script: Mutex<VecDeque<Result<(), PushError>>>,
}

/// Storefront double: records pushes, serves a static catalog, and pops
/// scripted push outcomes before defaulting to success.
#[derive(Clone, Default)]
pub struct StorefrontDouble {
    inner: Arc<StorefrontInner>,
}

impl StorefrontDouble {
    pub fn with_products(products: Vec<RemoteProduct>) -> Self {
        let double = Self::default();
        *double.inner.products.lock() = products;
        double
    }

    pub fn set_products(&self, products: Vec<RemoteProduct>) {
        *self.inner.products.lock() = products;
    }

    /// Queue outcomes for upcoming pushes; once drained, pushes succeed.
    pub fn script_failures(&self, outcomes: Vec<PushError>) {
        let mut script = self.inner.script.lock();
        for outcome in outcomes {
            script.push_back(Err(outcome));
        }
    }

    pub fn pushes(&self) -> Vec<Push> {
        self.inner.pushes.lock().clone()
    }

    pub fn push_count(&self) -> usize {
        self.inner.pushes.lock().len()
    }
}

#[async_trait]
impl RemoteStockWriter for StorefrontDouble {
    async fn set_stock(
        &self,
        site: &Site,
        remote: &RemoteProductRef,
        quantity: i64,
    ) -> Result<(), PushError> {
        if let Some(Err(e)) = self.inner.script.lock().pop_front() {
            return Err(e);
        }
        self.inner.pushes.lock().push(Push {
            site_id: site.site_id.clone(),
            remote: *remote,
            quantity,
        });
        Ok(())
    }
}

#[async_trait]
impl RemoteCatalog for StorefrontDouble {
    async fn products(&self, _site: &Site) -> Result<Vec<RemoteProduct>, MappingError> {
        Ok(self.inner.products.lock().clone())
    }

    async fn variations(
        &self,
        _site: &Site,
        _product_id: u64,
    ) -> Result<Vec<RemoteVariation>, MappingError> {
        Ok(Vec::new())
    }
}

pub type TestLedger = LedgerService<InMemoryStore, FixedClock>;
pub type TestMapping =
    MappingService<StorefrontDouble, InMemoryMappingRepository, LedgerProductSink, FixedClock>;
pub type TestDispatcher = PropagationDispatcher<
    StorefrontDouble,
    LedgerStockReader,
    MappingResolveAdapter,
    ConfigSiteDirectory,
    InMemoryFailureStore,
    FixedClock,
>;
pub type TestReconciler = ReconcileService<
    MappingRefresherAdapter,
    MappingIndexAdapter,
    DispatcherResync,
    ConfigSiteDirectory,
>;

/// The in-memory engine.
pub struct Harness {
    pub ledger: Arc<TestLedger>,
    pub mapping: Arc<TestMapping>,
    pub dispatcher: Arc<TestDispatcher>,
    pub reconciler: Arc<TestReconciler>,
    pub storefront: StorefrontDouble,
    pub failures: Arc<InMemoryFailureStore>,
}

impl Harness {
    pub fn new(sites: Vec<Site>, catalog: Vec<RemoteProduct>, config: PropagationConfig) -> Self {
        let storefront = StorefrontDouble::with_products(catalog);
        let failures = Arc::new(InMemoryFailureStore::new());

        let ledger: Arc<TestLedger> = Arc::new(LedgerService::new(
            InMemoryStore::new(),
            FixedClock::at(1_000),
            LedgerConfig::default(),
        ));

        let mapping: Arc<TestMapping> = Arc::new(MappingService::new(
            storefront.clone(),
            InMemoryMappingRepository::new(),
            LedgerProductSink(ledger.clone()),
            FixedClock::at(1_000),
        ));

        let directory = ConfigSiteDirectory::new(sites);

        let dispatcher: Arc<TestDispatcher> = Arc::new(PropagationDispatcher::new(
            config,
            Arc::new(storefront.clone()),
            Arc::new(LedgerStockReader(ledger.clone())),
            Arc::new(MappingResolveAdapter(mapping.clone())),
            Arc::new(directory.clone()),
            Arc::clone(&failures),
            Arc::new(FixedClock::at(1_000)),
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

        Self {
            ledger,
            mapping,
            dispatcher,
            reconciler,
            storefront,
            failures,
        }
    }

    /// Apply one event and fan out on success, the way the runtime does.
    pub fn handle_event(&self, event: &NormalizedEvent) -> mesh_ledger::MutationOutcome {
        use mesh_ledger::StockMutationApi;
        use mesh_propagation::PropagationApi;

        let outcome = self.ledger.apply_event(event).expect("mutation failed");
        if outcome.applied {
            self.dispatcher
                .enqueue_fanout(&event.site_id, &event.sku, outcome.new_on_hand)
                .expect("fan-out rejected");
        }
        outcome
    }

    /// Harness with fast retry timings for tests that exercise backoff.
    pub fn fast(sites: Vec<Site>, catalog: Vec<RemoteProduct>, max_attempts: u32) -> Self {
        Self::new(
            sites,
            catalog,
            PropagationConfig {
                workers: 2,
                queue_capacity: 256,
                max_attempts,
                retry_base_ms: 1,
                retry_max_delay_ms: 4,
                push_timeout_ms: 1_000,
            },
        )
    }
}

/// A site entry with placeholder credentials.
pub fn make_site(site_id: &str) -> Site {
    Site {
        site_id: site_id.into(),
        base_url: format!("https://{site_id}.example.com"),
        api_key: "ck_test".to_string(),
        api_secret: "cs_test".to_string(),
        active: true,
    }
}

/// A simple catalog product.
pub fn simple_product(id: u64, sku: &str) -> RemoteProduct {
    RemoteProduct {
        id,
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        kind: ProductKind::Simple,
    }
}

/// A normalized decrement event.
pub fn decrement(site: &str, order: &str, line: &str, sku: &str, qty: u32) -> NormalizedEvent {
    NormalizedEvent {
        site_id: site.into(),
        order_id: order.to_string(),
        line_item_id: line.to_string(),
        sku: Sku::new(sku),
        kind: EventKind::Decrement,
        quantity: qty,
    }
}

/// A normalized refund event (stock returns).
pub fn refund(site: &str, order: &str, line: &str, sku: &str, qty: u32) -> NormalizedEvent {
    NormalizedEvent {
        kind: EventKind::Refund,
        ..decrement(site, order, line, sku, qty)
    }
}

/// Poll until `condition` holds or two seconds elapse.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
