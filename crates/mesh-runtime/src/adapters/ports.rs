//! Bridges between subsystem ports.
//!
//! Subsystem crates never depend on each other; these adapters implement
//! one crate's outbound port by delegating to another crate's inbound API,
//! converting the error types at the boundary.

use std::sync::Arc;

use async_trait::async_trait;

use mesh_ledger::{StockMutationApi, StockQueryApi};
use mesh_mapping::MappingApi;
use mesh_propagation::{MappingLookup, PropagationApi, PropagationError, StockReader};
use mesh_reconcile::{
    MappingIndex, MappingRefresher, ReconcileError, RefreshOutcome, StockResync,
};
use shared_types::{RemoteProductRef, Site, SiteId, Sku};

/// Ledger reads for the propagation dispatcher's send-time lookup.
#[derive(Clone)]
pub struct LedgerStockReader(pub Arc<dyn StockQueryApi>);

impl StockReader for LedgerStockReader {
    fn on_hand(&self, sku: &Sku) -> Result<Option<i64>, PropagationError> {
        self.0
            .on_hand(sku)
            .map_err(|e| PropagationError::Storage(e.to_string()))
    }
}

/// Product upserts for mapping refresh, writing through the ledger.
#[derive(Clone)]
pub struct LedgerProductSink(pub Arc<dyn StockMutationApi>);

impl mesh_mapping::ProductSink for LedgerProductSink {
    fn upsert_product(&self, sku: &Sku, name: &str) -> Result<(), mesh_mapping::MappingError> {
        self.0
            .upsert_product(sku, name)
            .map_err(|e| mesh_mapping::MappingError::Storage(e.to_string()))
    }
}

/// Mapping resolution for propagation workers.
#[derive(Clone)]
pub struct MappingResolveAdapter(pub Arc<dyn MappingApi>);

impl MappingLookup for MappingResolveAdapter {
    fn resolve(
        &self,
        site_id: &SiteId,
        sku: &Sku,
    ) -> Result<Option<RemoteProductRef>, PropagationError> {
        self.0
            .resolve(site_id, sku)
            .map_err(|e| PropagationError::Storage(e.to_string()))
    }
}

/// Mapping refresh for the reconciliation driver.
#[derive(Clone)]
pub struct MappingRefresherAdapter(pub Arc<dyn MappingApi>);

#[async_trait]
impl MappingRefresher for MappingRefresherAdapter {
    async fn refresh(&self, site: &Site) -> Result<RefreshOutcome, ReconcileError> {
        let summary = self
            .0
            .refresh(site)
            .await
            .map_err(|e| ReconcileError::Refresh(e.to_string()))?;
        Ok(RefreshOutcome {
            mapped: summary.mapped,
            conflicts: summary.conflicts,
            errors: summary.errors,
        })
    }
}

/// Mapped-SKU listing for the reconciliation driver.
#[derive(Clone)]
pub struct MappingIndexAdapter(pub Arc<dyn MappingApi>);

impl MappingIndex for MappingIndexAdapter {
    fn mapped_skus(&self, site_id: &SiteId) -> Result<Vec<Sku>, ReconcileError> {
        Ok(self
            .0
            .mappings_for(site_id)
            .map_err(|e| ReconcileError::Storage(e.to_string()))?
            .into_iter()
            .map(|m| m.sku)
            .collect())
    }
}

/// Resync pushes for the reconciliation driver, routed through the
/// dispatcher so the normal retry policy applies.
#[derive(Clone)]
pub struct DispatcherResync {
    pub dispatcher: Arc<dyn PropagationApi>,
    pub stock: Arc<dyn StockQueryApi>,
}

impl StockResync for DispatcherResync {
    fn push_current(&self, site_id: &SiteId, sku: &Sku) -> Result<(), ReconcileError> {
        let quantity = self
            .stock
            .on_hand(sku)
            .map_err(|e| ReconcileError::Storage(e.to_string()))?
            .unwrap_or(0);
        self.dispatcher
            .enqueue_for_site(site_id, sku, quantity)
            .map_err(|e| ReconcileError::Resync(e.to_string()))
    }
}
