//! # Stock Ledger Subsystem
//!
//! The authoritative persistence layer for stock state (the single source of
//! truth). Every stock-affecting event is applied here exactly once; every
//! replica quantity in the system derives from this crate's tables.
//!
//! ## Architecture Role
//!
//! ```text
//! [Webhook ingest] ──NormalizedEvent──→ [Stock Ledger]
//!                                            │ applied mutation
//!                                            ↓
//!                                    [Propagation Dispatcher]
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Event Uniqueness | One ledger row per (site, order, line item, kind) |
//! | 2 | Replay Is Success | A duplicate event is a no-op, not an error |
//! | 3 | Per-SKU Serialization | At most one in-flight mutation per SKU |
//! | 4 | Atomic Commit | Ledger row and stock row land in one batch |
//! | 5 | Stock Floor | On-hand never drops below zero unless backorders allow it |
//! | 6 | Sticky Clamp | A clamp is final; later events never recompute it |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities, value objects, errors, the SKU lock table
//! - `ports/` - Inbound API traits and the storage SPI
//! - `service.rs` - `LedgerService`, generic over storage and clock
//! - `keys.rs` - Storage key encoding for the ledger tables
//! - `test_utils.rs` - In-memory storage adapter and fixed clock

pub mod domain;
pub mod keys;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use domain::entities::{LedgerEntry, Product, StockRecord};
pub use domain::errors::LedgerError;
pub use domain::locks::SkuLockTable;
pub use domain::value_objects::{LedgerConfig, LineResult, MutationOutcome};
pub use ports::inbound::{StockMutationApi, StockQueryApi};
pub use ports::outbound::{BatchOperation, KeyValueStore, KvError};
pub use service::LedgerService;
