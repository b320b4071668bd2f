//! Inbound ports (API) for the stock ledger.

use shared_types::{EventKey, EventKind, LineItem, NormalizedEvent, SiteId, Sku};

use crate::domain::entities::{LedgerEntry, Product, StockRecord};
use crate::domain::errors::LedgerError;
use crate::domain::value_objects::{LineResult, MutationOutcome};

/// Mutating operations against the source of truth.
///
/// Errors from these calls mean the authoritative write did not happen and
/// must bubble to the caller; the upstream webhook sender owns the retry.
pub trait StockMutationApi: Send + Sync {
    /// Apply one normalized event. Idempotent per the event's 4-tuple key.
    fn apply_event(&self, event: &NormalizedEvent) -> Result<MutationOutcome, LedgerError>;

    /// Apply every line of an order in order. The sign of each delta is
    /// derived from `kind`. Returns one result per line so callers can fan
    /// out propagation only for newly applied lines.
    fn apply_order(
        &self,
        site_id: &SiteId,
        order_id: &str,
        lines: &[LineItem],
        kind: EventKind,
    ) -> Result<Vec<LineResult>, LedgerError>;

    /// Create or update the product row for a SKU, keeping its stock row
    /// alongside. Used by mapping refresh when it discovers catalog names.
    fn upsert_product(&self, sku: &Sku, name: &str) -> Result<(), LedgerError>;
}

/// Read-only operations exposed to operational tooling.
pub trait StockQueryApi: Send + Sync {
    /// Current on-hand for a SKU; `None` for SKUs never seen.
    fn on_hand(&self, sku: &Sku) -> Result<Option<i64>, LedgerError>;

    fn stock(&self, sku: &Sku) -> Result<Option<StockRecord>, LedgerError>;

    /// All stock rows, ordered by SKU.
    fn all_stock(&self) -> Result<Vec<StockRecord>, LedgerError>;

    fn product(&self, sku: &Sku) -> Result<Option<Product>, LedgerError>;

    /// Whether the journal already holds an entry for this 4-tuple.
    fn contains_event(&self, key: &EventKey) -> Result<bool, LedgerError>;

    /// Applied ledger entries for one SKU, in key order.
    fn entries_for_sku(&self, sku: &Sku) -> Result<Vec<LedgerEntry>, LedgerError>;
}
