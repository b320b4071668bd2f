//! # Mapping Service
//!
//! Rebuilds and serves the per-site SKU mapping table.
//!
//! ## Refresh Passes
//!
//! Refresh walks the remote catalog in two passes so that variation SKUs
//! always win over parent-product SKUs:
//!
//! 1. every variation of every variable product;
//! 2. every product-level SKU (simple products, and the parent SKU of
//!    variable products).
//!
//! Within a refresh the first match for a SKU claims it; later candidates
//! are discarded and logged. Rows are upserted, never deleted: a SKU that
//! vanished remotely keeps its stale row until an operator removes it, and
//! resolution stays lock-free against a refresh in progress.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{info, warn};

use shared_types::{Clock, RemoteProductRef, Site, SiteId, Sku};

use crate::domain::entities::{ProductKind, RefreshSummary, SiteMapping};
use crate::domain::errors::MappingError;
use crate::ports::inbound::MappingApi;
use crate::ports::outbound::{MappingRepository, ProductSink, RemoteCatalog};

/// The SKU mapping service.
pub struct MappingService<R, S, P, C>
where
    R: RemoteCatalog,
    S: MappingRepository,
    P: ProductSink,
    C: Clock,
{
    catalog: R,
    repo: S,
    products: P,
    clock: C,
}

impl<R, S, P, C> MappingService<R, S, P, C>
where
    R: RemoteCatalog,
    S: MappingRepository,
    P: ProductSink,
    C: Clock,
{
    pub fn new(catalog: R, repo: S, products: P, clock: C) -> Self {
        Self {
            catalog,
            repo,
            products,
            clock,
        }
    }

    /// Claim `sku` for this refresh and write its mapping row.
    ///
    /// Returns false (and counts a conflict) when an earlier candidate
    /// already claimed the SKU.
    fn claim(
        &self,
        site: &Site,
        claimed: &mut HashSet<Sku>,
        summary: &mut RefreshSummary,
        sku: Sku,
        name: &str,
        remote: RemoteProductRef,
    ) -> Result<(), MappingError> {
        if claimed.contains(&sku) {
            warn!(
                site = %site.site_id,
                sku = %sku,
                product_id = remote.product_id,
                "conflicting catalog match discarded"
            );
            summary.conflicts += 1;
            return Ok(());
        }

        self.products.upsert_product(&sku, name)?;
        self.repo.put(&SiteMapping {
            site_id: site.site_id.clone(),
            sku: sku.clone(),
            product_id: remote.product_id,
            variation_id: remote.variation_id,
            refreshed_at: self.clock.now_ms(),
        })?;

        claimed.insert(sku);
        summary.mapped += 1;
        Ok(())
    }
}

#[async_trait]
impl<R, S, P, C> MappingApi for MappingService<R, S, P, C>
where
    R: RemoteCatalog,
    S: MappingRepository,
    P: ProductSink,
    C: Clock,
{
    fn resolve(
        &self,
        site_id: &SiteId,
        sku: &Sku,
    ) -> Result<Option<RemoteProductRef>, MappingError> {
        Ok(self.repo.get(site_id, sku)?.map(|m| m.remote_ref()))
    }

    fn mappings_for(&self, site_id: &SiteId) -> Result<Vec<SiteMapping>, MappingError> {
        self.repo.for_site(site_id)
    }

    async fn refresh(&self, site: &Site) -> Result<RefreshSummary, MappingError> {
        let products = self.catalog.products(site).await?;

        let mut summary = RefreshSummary::default();
        let mut claimed: HashSet<Sku> = HashSet::new();

        // Pass 1: variation SKUs.
        for product in products.iter().filter(|p| p.kind == ProductKind::Variable) {
            let variations = match self.catalog.variations(site, product.id).await {
                Ok(variations) => variations,
                Err(e) => {
                    summary
                        .errors
                        .push(format!("product {}: {}", product.id, e));
                    continue;
                }
            };

            for variation in variations {
                let sku = variation.sku.trim();
                if sku.is_empty() {
                    continue;
                }
                self.claim(
                    site,
                    &mut claimed,
                    &mut summary,
                    Sku::new(sku),
                    &product.name,
                    RemoteProductRef::variation(product.id, variation.id),
                )?;
            }
        }

        // Pass 2: product-level SKUs.
        for product in &products {
            let sku = product.sku.trim();
            if sku.is_empty() {
                continue;
            }
            self.claim(
                site,
                &mut claimed,
                &mut summary,
                Sku::new(sku),
                &product.name,
                RemoteProductRef::product(product.id),
            )?;
        }

        info!(
            site = %site.site_id,
            mapped = summary.mapped,
            conflicts = summary.conflicts,
            errors = summary.errors.len(),
            "mapping refresh complete"
        );
        Ok(summary)
    }
}
