//! Value objects and configuration for the stock ledger.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_types::Sku;

/// Ledger configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Maximum wait for the per-SKU lock before surfacing a transient error.
    pub lock_timeout_ms: u64,
    /// Backorder policy assigned to auto-registered products.
    pub default_backorders: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
            default_backorders: false,
        }
    }
}

/// Result of applying one event to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// False when the event was a replay of an already-applied 4-tuple.
    pub applied: bool,
    /// On-hand after the call; unchanged for replays.
    pub new_on_hand: i64,
    /// Id of the ledger row written by this call, absent for replays.
    pub ledger_id: Option<Uuid>,
}

/// Per-line result of a bulk order application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineResult {
    pub sku: Sku,
    pub applied: bool,
    pub new_on_hand: i64,
}
