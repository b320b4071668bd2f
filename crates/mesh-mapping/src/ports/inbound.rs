//! Inbound ports (API) for SKU mapping.

use async_trait::async_trait;

use shared_types::{RemoteProductRef, Site, SiteId, Sku};

use crate::domain::entities::{RefreshSummary, SiteMapping};
use crate::domain::errors::MappingError;

/// Resolution and refresh API offered to the rest of the engine.
#[async_trait]
pub trait MappingApi: Send + Sync {
    /// Translate a SKU to the site's remote product reference.
    ///
    /// `None` means not mapped: the caller decides whether that is a
    /// permanent failure (propagation) or simply a SKU to skip
    /// (reconciliation).
    fn resolve(&self, site_id: &SiteId, sku: &Sku) -> Result<Option<RemoteProductRef>, MappingError>;

    /// All mappings currently held for a site.
    fn mappings_for(&self, site_id: &SiteId) -> Result<Vec<SiteMapping>, MappingError>;

    /// Re-derive the mapping table for one site from its remote catalog.
    /// Idempotent; safe to run concurrently with resolution.
    async fn refresh(&self, site: &Site) -> Result<RefreshSummary, MappingError>;
}
