//! Wall-clock abstraction used to timestamp recorded events.
//!
//! Progression logic never reads the clock: stage timing is driven by the
//! `elapsed` values carried on frame ticks. The clock only stamps
//! `EventMetadata::occurred_at`, so tests inject a fixed instant.

use chrono::{DateTime, Utc};

/// Source of event timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
