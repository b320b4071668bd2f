//! In-memory adapters for tests.
//!
//! `InMemoryStore` backs the unit tests of this crate and the cross-crate
//! integration suite; the production RocksDB adapter lives in the runtime
//! crate.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use shared_types::{Clock, Timestamp};

use crate::ports::outbound::{BatchOperation, KeyValueStore, KvError};

/// BTreeMap-backed store. Ordered keys make `prefix_scan` deterministic.
#[derive(Default)]
pub struct InMemoryStore {
    map: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    fail: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails, for transient-error paths.
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    /// Toggle failure mode at runtime.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), KvError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(KvError::io("in-memory store set to fail"))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        self.check()?;
        Ok(self.map.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError> {
        self.check()?;
        self.map.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), KvError> {
        self.check()?;
        self.map.write().remove(key);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KvError> {
        self.check()?;
        Ok(self.map.read().contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError> {
        self.check()?;
        Ok(self
            .map
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KvError> {
        self.check()?;
        let mut map = self.map.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    map.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Clock pinned to a settable instant.
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    pub fn at(ms: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
