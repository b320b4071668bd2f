//! Entities of the mapping subsystem.

use serde::{Deserialize, Serialize};

use shared_types::{RemoteProductRef, SiteId, Sku, Timestamp};

/// One row of the per-site mapping table: where a SKU lives on a remote
/// storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMapping {
    pub site_id: SiteId,
    pub sku: Sku,
    pub product_id: u64,
    pub variation_id: Option<u64>,
    pub refreshed_at: Timestamp,
}

impl SiteMapping {
    pub fn remote_ref(&self) -> RemoteProductRef {
        RemoteProductRef {
            product_id: self.product_id,
            variation_id: self.variation_id,
        }
    }
}

/// Remote product shape as listed by a storefront catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub id: u64,
    pub sku: String,
    pub name: String,
    pub kind: ProductKind,
}

/// Whether a remote product carries variations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Simple,
    Variable,
}

/// One variation of a variable remote product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVariation {
    pub id: u64,
    pub sku: String,
}

/// Outcome of one mapping refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefreshSummary {
    /// SKUs mapped (inserted or re-confirmed) by this refresh.
    pub mapped: usize,
    /// Candidates discarded because an earlier match claimed the SKU.
    pub conflicts: usize,
    /// Per-product failures that did not abort the refresh.
    pub errors: Vec<String>,
}
