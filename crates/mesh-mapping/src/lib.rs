//! # SKU Mapping Subsystem
//!
//! Maintains the per-site SKU → remote-product-identifier table used by
//! propagation to address stock updates on each storefront.
//!
//! ## Architecture Role
//!
//! ```text
//! [Reconciliation] ──refresh(site)──→ [SKU Mapping] ──list catalog──→ [Remote Catalog]
//! [Propagation]    ──resolve(site, sku)──→ cached table
//! ```
//!
//! ## Matching Rules
//!
//! - Variation SKUs take precedence over parent-product SKUs.
//! - Within one refresh the first match for a SKU wins; later conflicting
//!   matches are discarded, logged, and counted in the summary.
//! - Stale rows are tolerated until the next refresh; resolution never
//!   blocks on a refresh in progress.

pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use domain::entities::{
    ProductKind, RefreshSummary, RemoteProduct, RemoteVariation, SiteMapping,
};
pub use domain::errors::MappingError;
pub use ports::inbound::MappingApi;
pub use ports::outbound::{MappingRepository, ProductSink, RemoteCatalog};
pub use service::MappingService;
