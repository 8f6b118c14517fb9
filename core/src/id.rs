//! Timestamp-derived todo ids.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Hands out ids from the wall clock in milliseconds. Two calls within the
/// same millisecond, or a clock that steps backwards, get `last + 1`, so ids
/// from one generator are strictly increasing.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        self.next_after(Utc::now().timestamp_millis()).to_string()
    }

    fn next_after(&self, now: i64) -> i64 {
        let next = |last: i64| now.max(last + 1);
        match self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(next(last)))
        {
            Ok(previous) | Err(previous) => next(previous),
        }
    }
}
