//! # Runtime Configuration
//!
//! Unified configuration for all subsystems, loaded from the environment
//! at startup. The site list arrives as a JSON array in `MESH_SITES`, the
//! same shape the registry collaborator exports.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mesh_ledger::LedgerConfig;
use mesh_propagation::PropagationConfig;
use shared_types::{Site, SiteId};

use crate::settings::EngineSettings;

/// Complete runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Data directory holding the store and the process lock.
    pub data_dir: PathBuf,
    /// Outbound HTTP timeout for storefront calls.
    pub http_timeout_ms: u64,
    /// Cadence of the scheduled full reconciliation; 0 disables it. This
    /// is also the upper bound on how long a crash-dropped propagation
    /// task stays unhealed, so keep it tight.
    pub reconcile_interval_secs: u64,
    /// Whether scheduled reconciliation also resyncs stock.
    pub reconcile_push_stock: bool,
    /// Registered storefronts.
    pub sites: Vec<Site>,
    pub ledger: LedgerConfig,
    pub propagation: PropagationConfig,
    pub settings: EngineSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            http_timeout_ms: 30_000,
            reconcile_interval_secs: 3_600,
            reconcile_push_stock: true,
            sites: Vec::new(),
            ledger: LedgerConfig::default(),
            propagation: PropagationConfig::default(),
            settings: EngineSettings::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MESH_SITES is not valid JSON: {0}")]
    InvalidSites(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("duplicate site id: {0}")]
    DuplicateSite(SiteId),

    #[error("site {0} has empty credentials")]
    MissingCredentials(SiteId),
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

impl RuntimeConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let sites = match std::env::var("MESH_SITES") {
            Err(_) => Vec::new(),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| ConfigError::InvalidSites(e.to_string()))?,
        };

        let config = Self {
            data_dir: env_parse("MESH_DATA_DIR", defaults.data_dir)?,
            http_timeout_ms: env_parse("MESH_HTTP_TIMEOUT_MS", defaults.http_timeout_ms)?,
            reconcile_interval_secs: env_parse(
                "MESH_RECONCILE_INTERVAL_SECS",
                defaults.reconcile_interval_secs,
            )?,
            reconcile_push_stock: env_parse(
                "MESH_RECONCILE_PUSH_STOCK",
                defaults.reconcile_push_stock,
            )?,
            sites,
            ledger: LedgerConfig {
                lock_timeout_ms: env_parse("MESH_LOCK_TIMEOUT_MS", defaults.ledger.lock_timeout_ms)?,
                default_backorders: env_parse(
                    "MESH_BACKORDERS_DEFAULT",
                    defaults.ledger.default_backorders,
                )?,
            },
            propagation: PropagationConfig {
                workers: env_parse("MESH_WORKERS", defaults.propagation.workers)?,
                queue_capacity: env_parse(
                    "MESH_QUEUE_CAPACITY",
                    defaults.propagation.queue_capacity,
                )?,
                max_attempts: env_parse("MESH_MAX_ATTEMPTS", defaults.propagation.max_attempts)?,
                retry_base_ms: env_parse("MESH_RETRY_BASE_MS", defaults.propagation.retry_base_ms)?,
                retry_max_delay_ms: env_parse(
                    "MESH_RETRY_MAX_DELAY_MS",
                    defaults.propagation.retry_max_delay_ms,
                )?,
                push_timeout_ms: env_parse(
                    "MESH_PUSH_TIMEOUT_MS",
                    defaults.propagation.push_timeout_ms,
                )?,
            },
            settings: EngineSettings {
                decrement_status: env_parse(
                    "MESH_DECREMENT_STATUS",
                    defaults.settings.decrement_status,
                )?,
                webhook_auth_mode: defaults.settings.webhook_auth_mode,
                backorders_default: env_parse(
                    "MESH_BACKORDERS_DEFAULT",
                    defaults.settings.backorders_default,
                )?,
            },
        };
        Ok(config)
    }

    /// Validate for production use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for site in &self.sites {
            if !seen.insert(site.site_id.clone()) {
                return Err(ConfigError::DuplicateSite(site.site_id.clone()));
            }
            if site.api_key.is_empty() || site.api_secret.is_empty() {
                return Err(ConfigError::MissingCredentials(site.site_id.clone()));
            }
        }
        Ok(())
    }
}
