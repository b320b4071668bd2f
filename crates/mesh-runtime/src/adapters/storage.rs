//! # RocksDB Storage Adapter
//!
//! Production implementation of the ledger's `KeyValueStore` plus the
//! mapping-repository and dead-letter stores, all over one RocksDB
//! instance with prefixed keys.
//!
//! ## Key Layout
//!
//! - `product:<sku>` / `stock:<sku>` / `event:<...>` - owned by the ledger
//! - `map:<site>\x1f<sku>` - mapping table
//! - `dlq:<uuid>` - dead letters
//!
//! ## Durability
//!
//! Batch writes go through a single `WriteBatch`; with `sync_writes` on,
//! every write is fsynced before the call returns.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rocksdb::{IteratorMode, Options, WriteBatch, WriteOptions, DB};
use uuid::Uuid;

use mesh_ledger::{BatchOperation, KeyValueStore, KvError};
use mesh_mapping::{MappingError, MappingRepository, SiteMapping};
use mesh_propagation::{FailureStore, PropagationError, PropagationFailure};
use shared_types::{SiteId, Sku};

/// RocksDB configuration.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory.
    pub path: PathBuf,
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
    /// Enable fsync after each write.
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/db"),
            write_buffer_size: 64 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Config for tests: small buffers, no fsync.
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed key-value store.
///
/// Cheap to clone; clones share the same database handle. RocksDB is
/// internally synchronized, so no extra locking is layered on top.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    sync_writes: bool,
}

impl RocksDbStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, KvError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| KvError::io(format!("failed to open RocksDB: {e}")))?;

        Ok(Self {
            db: Arc::new(db),
            sync_writes: config.sync_writes,
        })
    }

    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, KvError> {
        Self::open(RocksDbConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    fn write_opts(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.sync_writes);
        opts
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        self.db
            .get(key)
            .map_err(|e| KvError::io(format!("RocksDB get failed: {e}")))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError> {
        self.db
            .put_opt(key, value, &self.write_opts())
            .map_err(|e| KvError::io(format!("RocksDB put failed: {e}")))
    }

    fn delete(&self, key: &[u8]) -> Result<(), KvError> {
        self.db
            .delete_opt(key, &self.write_opts())
            .map_err(|e| KvError::io(format!("RocksDB delete failed: {e}")))
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KvError> {
        self.db
            .get_pinned(key)
            .map(|v| v.is_some())
            .map_err(|e| KvError::io(format!("RocksDB exists check failed: {e}")))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError> {
        let mut results = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(prefix, rocksdb::Direction::Forward));

        for item in iter {
            match item {
                Ok((key, value)) => {
                    if !key.starts_with(prefix) {
                        break;
                    }
                    results.push((key.to_vec(), value.to_vec()));
                }
                Err(e) => return Err(KvError::io(format!("RocksDB scan failed: {e}"))),
            }
        }
        Ok(results)
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KvError> {
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
                BatchOperation::Delete { key } => batch.delete(&key),
            }
        }

        self.db
            .write_opt(batch, &self.write_opts())
            .map_err(|e| KvError::io(format!("RocksDB batch write failed: {e}")))
    }
}

// =============================================================================
// MAPPING REPOSITORY
// =============================================================================

const MAP_PREFIX: &[u8] = b"map:";
const SEP: u8 = 0x1F;

fn map_key(site_id: &SiteId, sku: &Sku) -> Vec<u8> {
    let mut key = Vec::with_capacity(MAP_PREFIX.len() + site_id.as_str().len() + sku.as_str().len() + 1);
    key.extend_from_slice(MAP_PREFIX);
    key.extend_from_slice(site_id.as_str().as_bytes());
    key.push(SEP);
    key.extend_from_slice(sku.as_str().as_bytes());
    key
}

fn map_site_prefix(site_id: &SiteId) -> Vec<u8> {
    let mut key = Vec::with_capacity(MAP_PREFIX.len() + site_id.as_str().len() + 1);
    key.extend_from_slice(MAP_PREFIX);
    key.extend_from_slice(site_id.as_str().as_bytes());
    key.push(SEP);
    key
}

/// Mapping table over the shared RocksDB store.
#[derive(Clone)]
pub struct RocksDbMappingRepository {
    store: RocksDbStore,
}

impl RocksDbMappingRepository {
    pub fn new(store: RocksDbStore) -> Self {
        Self { store }
    }
}

impl MappingRepository for RocksDbMappingRepository {
    fn get(&self, site_id: &SiteId, sku: &Sku) -> Result<Option<SiteMapping>, MappingError> {
        match self
            .store
            .get(&map_key(site_id, sku))
            .map_err(|e| MappingError::Storage(e.to_string()))?
        {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| MappingError::Storage(format!("corrupt mapping row: {e}"))),
        }
    }

    fn put(&self, mapping: &SiteMapping) -> Result<(), MappingError> {
        let value = serde_json::to_vec(mapping)
            .map_err(|e| MappingError::Storage(e.to_string()))?;
        self.store
            .put(&map_key(&mapping.site_id, &mapping.sku), &value)
            .map_err(|e| MappingError::Storage(e.to_string()))
    }

    fn for_site(&self, site_id: &SiteId) -> Result<Vec<SiteMapping>, MappingError> {
        let rows = self
            .store
            .prefix_scan(&map_site_prefix(site_id))
            .map_err(|e| MappingError::Storage(e.to_string()))?;

        let mut mappings = Vec::with_capacity(rows.len());
        for (_, value) in rows {
            mappings.push(
                serde_json::from_slice(&value)
                    .map_err(|e| MappingError::Storage(format!("corrupt mapping row: {e}")))?,
            );
        }
        Ok(mappings)
    }
}

// =============================================================================
// DEAD-LETTER STORE
// =============================================================================

const DLQ_PREFIX: &[u8] = b"dlq:";

fn dlq_key(id: &Uuid) -> Vec<u8> {
    let mut key = Vec::with_capacity(DLQ_PREFIX.len() + 36);
    key.extend_from_slice(DLQ_PREFIX);
    key.extend_from_slice(id.to_string().as_bytes());
    key
}

/// Dead-letter table over the shared RocksDB store.
#[derive(Clone)]
pub struct RocksDbFailureStore {
    store: RocksDbStore,
}

impl RocksDbFailureStore {
    pub fn new(store: RocksDbStore) -> Self {
        Self { store }
    }
}

impl FailureStore for RocksDbFailureStore {
    fn append(&self, failure: &PropagationFailure) -> Result<(), PropagationError> {
        let value = serde_json::to_vec(failure)
            .map_err(|e| PropagationError::Storage(e.to_string()))?;
        self.store
            .put(&dlq_key(&failure.id), &value)
            .map_err(|e| PropagationError::Storage(e.to_string()))
    }

    fn list(&self) -> Result<Vec<PropagationFailure>, PropagationError> {
        let rows = self
            .store
            .prefix_scan(DLQ_PREFIX)
            .map_err(|e| PropagationError::Storage(e.to_string()))?;

        let mut failures: Vec<PropagationFailure> = Vec::with_capacity(rows.len());
        for (_, value) in rows {
            failures.push(
                serde_json::from_slice(&value)
                    .map_err(|e| PropagationError::Storage(format!("corrupt dead letter: {e}")))?,
            );
        }
        failures.sort_by_key(|f| f.created_at);
        Ok(failures)
    }

    fn get(&self, id: &Uuid) -> Result<Option<PropagationFailure>, PropagationError> {
        match self
            .store
            .get(&dlq_key(id))
            .map_err(|e| PropagationError::Storage(e.to_string()))?
        {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| PropagationError::Storage(format!("corrupt dead letter: {e}"))),
        }
    }

    fn remove(&self, id: &Uuid) -> Result<(), PropagationError> {
        self.store
            .delete(&dlq_key(id))
            .map_err(|e| PropagationError::Storage(e.to_string()))
    }
}
