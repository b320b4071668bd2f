//! Outbound ports (SPI) for stock propagation.

use async_trait::async_trait;
use uuid::Uuid;

use shared_types::{RemoteProductRef, Site, SiteId, Sku};

use crate::domain::entities::PropagationFailure;
use crate::domain::errors::{PropagationError, PushError};

/// Remote stock update interface, one implementation per remote system.
#[async_trait]
pub trait RemoteStockWriter: Send + Sync {
    /// Set the absolute stock quantity on the remote object.
    async fn set_stock(
        &self,
        site: &Site,
        remote: &RemoteProductRef,
        quantity: i64,
    ) -> Result<(), PushError>;
}

/// Read access to the authoritative on-hand value.
///
/// Workers call this at send time so a push always carries the current
/// truth, not the value captured at enqueue.
pub trait StockReader: Send + Sync {
    fn on_hand(&self, sku: &Sku) -> Result<Option<i64>, PropagationError>;
}

/// SKU resolution against the mapping table.
pub trait MappingLookup: Send + Sync {
    fn resolve(
        &self,
        site_id: &SiteId,
        sku: &Sku,
    ) -> Result<Option<RemoteProductRef>, PropagationError>;
}

/// Read-only view of the site registry.
pub trait SiteDirectory: Send + Sync {
    fn active_sites(&self) -> Vec<Site>;

    fn site(&self, site_id: &SiteId) -> Option<Site>;
}

/// Durable dead-letter storage. Append-only plus operator-driven removal.
pub trait FailureStore: Send + Sync {
    fn append(&self, failure: &PropagationFailure) -> Result<(), PropagationError>;

    fn list(&self) -> Result<Vec<PropagationFailure>, PropagationError>;

    fn get(&self, id: &Uuid) -> Result<Option<PropagationFailure>, PropagationError>;

    fn remove(&self, id: &Uuid) -> Result<(), PropagationError>;
}
