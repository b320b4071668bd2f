//! Outbound ports (SPI) for reconciliation.
//!
//! Reconciliation composes the other subsystems without depending on their
//! crates; the runtime bridges these traits onto the real services.

use async_trait::async_trait;

use shared_types::{Site, SiteId, Sku};

use crate::domain::entities::RefreshOutcome;
use crate::domain::errors::ReconcileError;

/// The mapping subsystem's refresh operation.
#[async_trait]
pub trait MappingRefresher: Send + Sync {
    async fn refresh(&self, site: &Site) -> Result<RefreshOutcome, ReconcileError>;
}

/// The SKUs currently mapped for a site.
pub trait MappingIndex: Send + Sync {
    fn mapped_skus(&self, site_id: &SiteId) -> Result<Vec<Sku>, ReconcileError>;
}

/// Hand one SKU's current on-hand to the propagation dispatcher.
pub trait StockResync: Send + Sync {
    fn push_current(&self, site_id: &SiteId, sku: &Sku) -> Result<(), ReconcileError>;
}

/// Read-only view of the site registry.
pub trait SiteDirectory: Send + Sync {
    fn active_sites(&self) -> Vec<Site>;

    fn site(&self, site_id: &SiteId) -> Option<Site>;
}
