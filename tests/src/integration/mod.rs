//! Cross-subsystem integration tests.

pub mod harness;

pub mod concurrency;
pub mod idempotency;
pub mod persistence;
pub mod propagation;
pub mod reconcile;
