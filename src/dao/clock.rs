//! Time source for proposal deadlines

use crate::dao::models::TimestampNs;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Provides the current time in nanoseconds since the Unix epoch
pub trait Clock: Send + Sync {
    fn now_ns(&self) -> TimestampNs;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ns(&self) -> TimestampNs {
        Utc::now()
            .timestamp_nanos_opt()
            .and_then(|ns| u64::try_from(ns).ok())
            .unwrap_or_default()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: TimestampNs) -> Self {
        Self { now: AtomicU64::new(start) }
    }

    pub fn set(&self, now: TimestampNs) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: TimestampNs) {
        self.now.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> TimestampNs {
        self.now.load(Ordering::SeqCst)
    }
}
