//! # Stock Propagation Subsystem
//!
//! Fans a successful stock mutation out to every other active storefront,
//! asynchronously, with retry, exponential backoff, and dead-lettering.
//!
//! ## Architecture Role
//!
//! ```text
//! [Stock Ledger] ──enqueue(origin, sku, qty)──→ [bounded queue]
//!                                                    │
//!                                         ┌──────────┼──────────┐
//!                                         ↓          ↓          ↓
//!                                     [worker]   [worker]   [worker]
//!                                         │ resolve + push
//!                                         ↓
//!                                  [remote storefront]──failure──→ [dead letters]
//! ```
//!
//! ## Ordering
//!
//! Tasks for the same (site, SKU) are NOT delivered in event order. Workers
//! read the current on-hand at send time, so any delivery order converges
//! on the authoritative value; the remote never keeps a full history.
//!
//! ## Failure Policy
//!
//! - Transient push failures retry with capped exponential backoff up to a
//!   configured attempt budget, then dead-letter.
//! - Permanent rejections and unmapped SKUs dead-letter immediately.
//! - Missing or inactive registry entries are configuration errors and
//!   dead-letter without touching the network.
//! - Nothing here ever re-surfaces to the mutation caller; the source of
//!   truth already committed.

pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use domain::entities::{PropagationFailure, PropagationTask};
pub use domain::errors::{PropagationError, PushError};
pub use domain::value_objects::{backoff_delay, PropagationConfig};
pub use ports::inbound::{DeadLetterApi, PropagationApi};
pub use ports::outbound::{
    FailureStore, MappingLookup, RemoteStockWriter, SiteDirectory, StockReader,
};
pub use service::PropagationDispatcher;
