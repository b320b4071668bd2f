//! In-memory adapters for tests.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use shared_types::{Clock, Site, SiteId, Sku, Timestamp};

use crate::domain::entities::{RemoteProduct, RemoteVariation, SiteMapping};
use crate::domain::errors::MappingError;
use crate::ports::outbound::{MappingRepository, ProductSink, RemoteCatalog};

/// Catalog serving a fixed product list.
#[derive(Default)]
pub struct StaticCatalog {
    products: Vec<RemoteProduct>,
    variations: HashMap<u64, Vec<RemoteVariation>>,
    failing_variations: HashSet<u64>,
}

impl StaticCatalog {
    pub fn new(products: Vec<RemoteProduct>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    pub fn add_variations(&mut self, product_id: u64, variations: Vec<RemoteVariation>) {
        self.variations.insert(product_id, variations);
    }

    /// Make variation listing fail for one product.
    pub fn fail_variations(&mut self, product_id: u64) {
        self.failing_variations.insert(product_id);
    }
}

#[async_trait]
impl RemoteCatalog for StaticCatalog {
    async fn products(&self, _site: &Site) -> Result<Vec<RemoteProduct>, MappingError> {
        Ok(self.products.clone())
    }

    async fn variations(
        &self,
        _site: &Site,
        product_id: u64,
    ) -> Result<Vec<RemoteVariation>, MappingError> {
        if self.failing_variations.contains(&product_id) {
            return Err(MappingError::Remote("variation listing failed".to_string()));
        }
        Ok(self.variations.get(&product_id).cloned().unwrap_or_default())
    }
}

/// Mapping table held in a BTreeMap; `for_site` comes back SKU-ordered.
#[derive(Default)]
pub struct InMemoryMappingRepository {
    rows: RwLock<BTreeMap<(SiteId, Sku), SiteMapping>>,
}

impl InMemoryMappingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MappingRepository for InMemoryMappingRepository {
    fn get(&self, site_id: &SiteId, sku: &Sku) -> Result<Option<SiteMapping>, MappingError> {
        Ok(self
            .rows
            .read()
            .get(&(site_id.clone(), sku.clone()))
            .cloned())
    }

    fn put(&self, mapping: &SiteMapping) -> Result<(), MappingError> {
        self.rows.write().insert(
            (mapping.site_id.clone(), mapping.sku.clone()),
            mapping.clone(),
        );
        Ok(())
    }

    fn for_site(&self, site_id: &SiteId) -> Result<Vec<SiteMapping>, MappingError> {
        Ok(self
            .rows
            .read()
            .values()
            .filter(|m| &m.site_id == site_id)
            .cloned()
            .collect())
    }
}

/// Product sink that discards writes.
pub struct NullProductSink;

impl ProductSink for NullProductSink {
    fn upsert_product(&self, _sku: &Sku, _name: &str) -> Result<(), MappingError> {
        Ok(())
    }
}

/// Clock pinned to a constant.
pub struct TestClock(pub Timestamp);

impl Clock for TestClock {
    fn now_ms(&self) -> Timestamp {
        self.0
    }
}
