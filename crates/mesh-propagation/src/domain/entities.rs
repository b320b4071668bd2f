//! Entities of the propagation subsystem.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_types::{SiteId, Sku, Timestamp};

/// One pending push of a SKU's quantity to one site.
///
/// Tasks live only in the queue; they are never persisted while pending.
/// `quantity` is the on-hand at enqueue time and serves as a fallback;
/// workers re-read the current value at send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationTask {
    pub site_id: SiteId,
    pub sku: Sku,
    pub quantity: i64,
    pub attempts: u32,
}

impl PropagationTask {
    pub fn new(site_id: SiteId, sku: Sku, quantity: i64) -> Self {
        Self {
            site_id,
            sku,
            quantity,
            attempts: 0,
        }
    }
}

/// A dead letter: a propagation task whose retries are exhausted or that
/// failed permanently. Terminal until an operator replays or purges it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationFailure {
    pub id: Uuid,
    pub site_id: SiteId,
    pub sku: Sku,
    /// Task payload: quantity captured at enqueue time.
    pub quantity: i64,
    /// Last error observed before giving up.
    pub error: String,
    pub attempts: u32,
    pub created_at: Timestamp,
    pub last_tried: Timestamp,
}
