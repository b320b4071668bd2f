//! Time abstraction shared by the subsystems that stamp rows.
//!
//! Services take a `Clock` so tests can pin timestamps; the production
//! implementation lives in the runtime crate.

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> Timestamp;
}
