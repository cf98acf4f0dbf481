//! Timestamp-based id allocation shared by the stores.
//!
//! # Invariants
//! - Every issued id is `max(now, last_issued + 1, max_existing + 1)`.
//! - Ids issued by one allocator are strictly increasing.

use crate::clock::Clock;

/// Issues millisecond-timestamp ids that never collide within one clock tick.
pub struct IdAllocator {
    clock: Box<dyn Clock>,
    last_issued: i64,
}

impl IdAllocator {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            last_issued: i64::MIN,
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Next id strictly above every id in `existing`.
    pub fn next(&mut self, existing: impl IntoIterator<Item = i64>) -> i64 {
        let max_existing = existing.into_iter().max().unwrap_or(i64::MIN);
        let next = self
            .clock
            .now_ms()
            .max(self.last_issued.saturating_add(1))
            .max(max_existing.saturating_add(1));
        self.last_issued = next;
        next
    }
}
