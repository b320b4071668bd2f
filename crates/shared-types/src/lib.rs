//! # Shared Types Crate
//!
//! Cross-subsystem vocabulary for the StockMesh engine. Every type that
//! crosses a subsystem boundary lives here: identifiers, the normalized
//! inbound event shape, the idempotency key, and the site registry entry.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Opaque Credentials**: the engine carries storefront credentials but
//!   never interprets them; encryption at rest belongs to the registry
//!   collaborator.

pub mod entities;
pub mod events;
pub mod time;

pub use entities::*;
pub use events::*;
pub use time::{Clock, Timestamp};
