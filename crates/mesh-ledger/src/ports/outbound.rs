//! Outbound ports (SPI) for the stock ledger.

use thiserror::Error;

/// Storage errors surfaced by `KeyValueStore` adapters.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("storage I/O error: {message}")]
    Io { message: String },
}

impl KvError {
    pub fn io(message: impl Into<String>) -> Self {
        KvError::Io {
            message: message.into(),
        }
    }
}

/// One operation inside an atomic batch.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Key-value storage interface for the ledger tables.
///
/// Adapters must make `atomic_batch_write` all-or-nothing; the mutation
/// path relies on it to commit the ledger row and the stock row as a unit.
/// Implementations are internally synchronized; methods take `&self`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError>;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError>;

    fn delete(&self, key: &[u8]) -> Result<(), KvError>;

    fn exists(&self, key: &[u8]) -> Result<bool, KvError>;

    /// All key/value pairs whose key starts with `prefix`, in key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError>;

    /// Apply every operation or none of them.
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KvError>;
}
