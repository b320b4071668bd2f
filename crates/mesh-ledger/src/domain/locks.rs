//! # Per-SKU Lock Table
//!
//! The sole serialization point of the mutation path. All correctness
//! hazards in this engine are per-SKU, so mutations on distinct SKUs never
//! block each other; two mutations on the same SKU are serialized here.
//!
//! Lock acquisition is bounded: a waiter that exceeds the timeout gets
//! `None` back and the caller surfaces a transient error instead of
//! deadlocking the request path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use shared_types::Sku;

/// Table of per-SKU mutexes, created lazily on first use.
///
/// The table only ever grows to the size of the known catalog, so entries
/// are not evicted.
#[derive(Default)]
pub struct SkuLockTable {
    locks: Mutex<HashMap<Sku, Arc<Mutex<()>>>>,
}

impl SkuLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `body` inside the critical section for `sku`, waiting at most
    /// `timeout` for the lock.
    ///
    /// Returns `None` on timeout without running `body`. The registry lock
    /// is held only long enough to clone the SKU's mutex handle, never
    /// across the wait or the body.
    pub fn with_lock<T>(
        &self,
        sku: &Sku,
        timeout: Duration,
        body: impl FnOnce() -> T,
    ) -> Option<T> {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(sku.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let _guard = lock.try_lock_for(timeout)?;
        Some(body())
    }

    /// Number of SKUs that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}
