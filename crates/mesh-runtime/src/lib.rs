//! # StockMesh Engine Runtime
//!
//! Assembles the subsystem crates into the running engine:
//!
//! - `config/` - environment-driven configuration with validation
//! - `settings` - versioned operator-tunable settings snapshot
//! - `adapters/` - production port implementations (RocksDB storage,
//!   storefront REST client, registry, clock, data-dir lock, subsystem
//!   bridges)
//! - `engine` - `SyncEngine`, the wired facade
//!
//! ## Startup Sequence
//!
//! 1. Initialize tracing (env-filter).
//! 2. Load and validate configuration.
//! 3. Lock the data directory and open the store.
//! 4. Wire subsystems and spawn the propagation worker pool.
//! 5. Spawn the reconciliation scheduler.
//! 6. Serve until shutdown; on shutdown, close the queue and let the
//!    workers drain.

pub mod adapters;
pub mod config;
pub mod engine;
pub mod settings;

pub use adapters::RestStorefrontClient;
pub use config::{ConfigError, RuntimeConfig};
pub use engine::SyncEngine;
pub use settings::{EngineSettings, SettingsHandle, WebhookAuthMode};
