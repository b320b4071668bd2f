//! Inbound ports (API) for stock propagation.

use uuid::Uuid;

use shared_types::{SiteId, Sku};

use crate::domain::entities::PropagationFailure;
use crate::domain::errors::PropagationError;

/// Enqueue operations offered to the mutation path and to reconciliation.
pub trait PropagationApi: Send + Sync {
    /// Enqueue one task per active site other than `origin`. Returns the
    /// number of tasks enqueued. A full queue rejects the enqueue with a
    /// retryable error instead of growing without bound.
    fn enqueue_fanout(
        &self,
        origin: &SiteId,
        sku: &Sku,
        quantity: i64,
    ) -> Result<usize, PropagationError>;

    /// Enqueue a push of `sku` to a single site (reconciliation resync).
    fn enqueue_for_site(
        &self,
        site_id: &SiteId,
        sku: &Sku,
        quantity: i64,
    ) -> Result<(), PropagationError>;
}

/// Dead-letter operations exposed to operational tooling.
pub trait DeadLetterApi: Send + Sync {
    /// All unresolved dead letters.
    fn failures(&self) -> Result<Vec<PropagationFailure>, PropagationError>;

    /// Re-enqueue the failed task. The row is removed only once the
    /// re-enqueue is accepted; a full queue leaves it in place.
    fn retry_failure(&self, id: &Uuid) -> Result<(), PropagationError>;

    /// Discard a dead letter. The only discard path for a task.
    fn purge_failure(&self, id: &Uuid) -> Result<(), PropagationError>;
}
