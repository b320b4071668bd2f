//! Inbound ports (API) for reconciliation.

use async_trait::async_trait;

use shared_types::SiteId;

use crate::domain::entities::ReconcileReport;
use crate::domain::errors::ReconcileError;

/// Reconciliation triggers exposed to the scheduler and to operators.
#[async_trait]
pub trait ReconcileApi: Send + Sync {
    /// Reconcile one site: refresh its mappings and, when `push_stock`,
    /// resync current on-hand for every mapped SKU.
    async fn reconcile(
        &self,
        site_id: &SiteId,
        push_stock: bool,
    ) -> Result<ReconcileReport, ReconcileError>;

    /// Reconcile every active site. Per-site failures are folded into the
    /// reports rather than aborting the run.
    async fn reconcile_all(&self, push_stock: bool) -> Vec<ReconcileReport>;
}
