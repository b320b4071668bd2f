//! Production clock.

use std::time::{SystemTime, UNIX_EPOCH};

use shared_types::{Clock, Timestamp};

/// Wall clock in epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}
