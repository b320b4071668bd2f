//! # Core Domain Entities
//!
//! Identifiers and registry entries shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `Sku`, `SiteId`
//! - **Registry**: `Site`
//! - **Remote Catalog**: `RemoteProductRef`

use serde::{Deserialize, Serialize};

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A stock-keeping unit. Global identity for a product across all sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(pub String);

impl Sku {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Sku {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Identifier of a storefront in the site registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub String);

impl SiteId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SiteId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

// =============================================================================
// CLUSTER B: SITE REGISTRY
// =============================================================================

/// One storefront entry from the site registry.
///
/// The registry is maintained by the administrative surface; the engine
/// treats it as a read-only lookup table. Credentials are opaque strings
/// passed through to the remote-push adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Registry identifier, unique across sites.
    pub site_id: SiteId,
    /// Base endpoint of the storefront REST API, without trailing slash.
    pub base_url: String,
    /// API consumer key (opaque).
    pub api_key: String,
    /// API consumer secret (opaque).
    pub api_secret: String,
    /// Inactive sites are excluded from propagation and reconciliation.
    pub active: bool,
}

// =============================================================================
// CLUSTER C: REMOTE CATALOG
// =============================================================================

/// Reference to a product object on a remote storefront.
///
/// A mapped SKU points either at a simple product (`variation_id` absent)
/// or at one variation of a variable product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProductRef {
    /// Remote product identifier.
    pub product_id: u64,
    /// Remote variation identifier, when the SKU maps to a variation.
    pub variation_id: Option<u64>,
}

impl RemoteProductRef {
    pub fn product(product_id: u64) -> Self {
        Self {
            product_id,
            variation_id: None,
        }
    }

    pub fn variation(product_id: u64, variation_id: u64) -> Self {
        Self {
            product_id,
            variation_id: Some(variation_id),
        }
    }
}
