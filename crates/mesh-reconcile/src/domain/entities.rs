//! Entities of the reconciliation subsystem.

use serde::{Deserialize, Serialize};

use shared_types::SiteId;

/// Outcome of the mapping-refresh half of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub mapped: usize,
    pub conflicts: usize,
    pub errors: Vec<String>,
}

/// Report for one site's reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub site_id: SiteId,
    /// SKUs mapped by the refresh pass.
    pub mapped: usize,
    /// Catalog matches discarded by the first-match rule.
    pub conflicts: usize,
    /// Refresh errors, including a fatal one when the catalog listing
    /// itself failed (in which case `mapped` is 0).
    pub refresh_errors: Vec<String>,
    /// Resync pushes handed to the dispatcher.
    pub pushed: usize,
    /// Resync pushes that could not be enqueued.
    pub push_errors: usize,
}

impl ReconcileReport {
    pub fn empty(site_id: SiteId) -> Self {
        Self {
            site_id,
            mapped: 0,
            conflicts: 0,
            refresh_errors: Vec::new(),
            pushed: 0,
            push_errors: 0,
        }
    }
}
