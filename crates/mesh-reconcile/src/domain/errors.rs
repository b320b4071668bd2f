//! Reconciliation error types.

use shared_types::SiteId;
use thiserror::Error;

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The site is not present in the registry.
    #[error("unknown site: {0}")]
    UnknownSite(SiteId),

    /// The mapping refresh failed outright.
    #[error("mapping refresh failed: {0}")]
    Refresh(String),

    /// The mapping table could not be read.
    #[error("storage failure: {0}")]
    Storage(String),

    /// A resync push could not be enqueued.
    #[error("resync push failed: {0}")]
    Resync(String),
}
