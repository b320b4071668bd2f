//! Configuration and retry schedule for propagation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Propagation configuration.
///
/// Every bound of the subsystem lives here; nothing is hardcoded at the
/// use sites.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Number of worker tasks draining the queue.
    pub workers: usize,
    /// Maximum queued tasks before enqueues are rejected.
    pub queue_capacity: usize,
    /// Attempt budget per task for transient failures.
    pub max_attempts: u32,
    /// Backoff base: the delay before the second attempt.
    pub retry_base_ms: u64,
    /// Upper bound on any single backoff delay.
    pub retry_max_delay_ms: u64,
    /// Per-attempt timeout on the remote push call, independent of the
    /// backoff delay between attempts.
    pub push_timeout_ms: u64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 10_000,
            max_attempts: 5,
            retry_base_ms: 2_000,
            retry_max_delay_ms: 60_000,
            push_timeout_ms: 30_000,
        }
    }
}

/// Delay before the attempt after `attempt` (1-based): `base * 2^(n-1)`,
/// capped at the configured maximum.
pub fn backoff_delay(config: &PropagationConfig, attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(31);
    let ms = config.retry_base_ms.saturating_mul(1u64 << exp);
    Duration::from_millis(ms.min(config.retry_max_delay_ms))
}
