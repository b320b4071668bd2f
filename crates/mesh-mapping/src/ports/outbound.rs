//! Outbound ports (SPI) for SKU mapping.

use async_trait::async_trait;

use shared_types::{Site, SiteId, Sku};

use crate::domain::entities::{RemoteProduct, RemoteVariation, SiteMapping};
use crate::domain::errors::MappingError;

/// Catalog listing interface of one remote storefront.
///
/// Implementations page through the remote API; the service sees the
/// complete listing.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// All products of the site's catalog.
    async fn products(&self, site: &Site) -> Result<Vec<RemoteProduct>, MappingError>;

    /// All variations of one variable product.
    async fn variations(
        &self,
        site: &Site,
        product_id: u64,
    ) -> Result<Vec<RemoteVariation>, MappingError>;
}

/// Persistence for the mapping table.
pub trait MappingRepository: Send + Sync {
    fn get(&self, site_id: &SiteId, sku: &Sku) -> Result<Option<SiteMapping>, MappingError>;

    fn put(&self, mapping: &SiteMapping) -> Result<(), MappingError>;

    /// All rows for one site, ordered by SKU.
    fn for_site(&self, site_id: &SiteId) -> Result<Vec<SiteMapping>, MappingError>;
}

/// Sink for product rows discovered during refresh.
///
/// The ledger owns product rows; this port lets refresh feed it catalog
/// names without a direct subsystem dependency.
pub trait ProductSink: Send + Sync {
    fn upsert_product(&self, sku: &Sku, name: &str) -> Result<(), MappingError>;
}
