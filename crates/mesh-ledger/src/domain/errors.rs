//! Ledger error types.
//!
//! Every variant here is transient from the caller's point of view: the
//! source-of-truth write did not happen and the upstream sender is expected
//! to redeliver. Duplicate events are not errors at all; they come back as
//! `MutationOutcome { applied: false, .. }`.

use shared_types::Sku;
use thiserror::Error;

/// Stock ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The per-SKU lock could not be acquired within the configured wait.
    #[error("lock timeout for sku {sku} after {waited_ms}ms")]
    LockTimeout { sku: Sku, waited_ms: u64 },

    /// The underlying store failed; the mutation was not committed.
    #[error("storage failure: {0}")]
    Storage(String),

    /// A persisted row failed to decode.
    #[error("corrupt row at {key}: {message}")]
    Corrupt { key: String, message: String },
}

impl From<crate::ports::outbound::KvError> for LedgerError {
    fn from(err: crate::ports::outbound::KvError) -> Self {
        LedgerError::Storage(err.to_string())
    }
}
