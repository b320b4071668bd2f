//! # Versioned Runtime Settings
//!
//! Operator-tunable behavior (decrement status, webhook auth mode, the
//! backorder default) modeled as an immutable snapshot behind a version
//! counter. Readers take the whole `Arc` once at the start of a cycle and
//! can never observe a torn update; writers replace the snapshot whole.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// How the webhook-ingest collaborator authenticates deliveries. Carried
/// here for that adapter; the engine itself never re-verifies events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookAuthMode {
    Hmac,
    Bearer,
}

/// One settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Order status that triggers a stock decrement.
    pub decrement_status: String,
    pub webhook_auth_mode: WebhookAuthMode,
    /// Backorder policy for products the engine auto-registers.
    pub backorders_default: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            decrement_status: "processing".to_string(),
            webhook_auth_mode: WebhookAuthMode::Hmac,
            backorders_default: false,
        }
    }
}

struct Versioned {
    version: u64,
    snapshot: Arc<EngineSettings>,
}

/// Handle to the current settings snapshot.
pub struct SettingsHandle {
    inner: RwLock<Versioned>,
}

impl SettingsHandle {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            inner: RwLock::new(Versioned {
                version: 1,
                snapshot: Arc::new(settings),
            }),
        }
    }

    /// The current snapshot. Stays valid for the caller's whole cycle even
    /// if an update lands meanwhile.
    pub fn snapshot(&self) -> Arc<EngineSettings> {
        Arc::clone(&self.inner.read().snapshot)
    }

    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    /// Replace the snapshot whole and bump the version.
    pub fn update(&self, settings: EngineSettings) -> u64 {
        let mut inner = self.inner.write();
        inner.version += 1;
        inner.snapshot = Arc::new(settings);
        inner.version
    }
}
