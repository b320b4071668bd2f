//! # Reconciliation Subsystem
//!
//! The drift-repair mechanism: rebuilds the SKU mapping table for a site
//! and, optionally, re-pushes the current authoritative on-hand for every
//! mapped SKU, a full-state resync that bypasses the ledger entirely.
//!
//! ## Architecture Role
//!
//! ```text
//! [scheduler / operator] ──reconcile(site)──→ [Reconciliation]
//!                                                  │ refresh mappings
//!                                                  ├────────────────→ [SKU Mapping]
//!                                                  │ push current on-hand per SKU
//!                                                  └────────────────→ [Propagation]
//! ```
//!
//! Because it only ever pushes the current authoritative value, a resync
//! is safe at any time, including concurrently with live traffic: a racing
//! mutation either lands before the read (and is pushed) or enqueues its
//! own fan-out afterwards. This is the designed safety net for dropped
//! propagation tasks, crashes, and manual edits on a remote.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{ReconcileReport, RefreshOutcome};
pub use domain::errors::ReconcileError;
pub use ports::inbound::ReconcileApi;
pub use ports::outbound::{MappingIndex, MappingRefresher, SiteDirectory, StockResync};
pub use service::ReconcileService;
