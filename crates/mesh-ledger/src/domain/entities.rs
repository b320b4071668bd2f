//! Persisted entities of the stock ledger.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_types::{EventKind, SiteId, Sku, Timestamp};

/// A product known to the engine.
///
/// Rows are created by mapping refresh or auto-registered on the first
/// event for an unknown SKU. Never deleted while stock or mapping rows
/// reference the SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: Sku,
    pub name: String,
    pub lead_time_days: u32,
    pub reorder_point: i64,
    /// When true, on-hand may go negative instead of clamping at zero.
    pub backorders: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// A bare product row for a SKU seen before any catalog data.
    pub fn bare(sku: Sku, backorders: bool, now: Timestamp) -> Self {
        let name = sku.as_str().to_string();
        Self {
            sku,
            name,
            lead_time_days: 0,
            reorder_point: 0,
            backorders,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Authoritative stock state for one SKU.
///
/// On-hand equals the sum of all ledger deltas for the SKU since creation,
/// clamped per policy at each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub sku: Sku,
    pub on_hand: i64,
    pub reserved: i64,
    pub updated_at: Timestamp,
}

impl StockRecord {
    pub fn empty(sku: Sku, now: Timestamp) -> Self {
        Self {
            sku,
            on_hand: 0,
            reserved: 0,
            updated_at: now,
        }
    }
}

/// One applied stock-affecting event. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub site_id: SiteId,
    pub order_id: String,
    pub line_item_id: String,
    pub sku: Sku,
    /// Signed delta that was applied (pre-clamp).
    pub delta: i64,
    pub kind: EventKind,
    pub created_at: Timestamp,
}
