//! Live run progress.
//!
//! Counters are lock-free atomics so a UI thread can poll them while the
//! run is in flight; only the last error message sits behind a mutex.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Callback invoked after every completed tile.
pub type ProgressObserver = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Shared progress counters for one run.
#[derive(Debug, Default)]
pub struct RunProgress {
    total: AtomicU64,
    current: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl RunProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new run of `total` tiles, clearing previous counts.
    pub fn reset(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.current.store(0, Ordering::Relaxed);
        self.succeeded.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        *self.last_error.lock() = None;
    }

    pub(crate) fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, message: String) {
        *self.last_error.lock() = Some(message);
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Tiles completed so far, successful or not.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total(),
            current: self.current(),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            last_error: self.last_error(),
        }
    }
}

/// Progress counters captured at one moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total: u64,
    pub current: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub last_error: Option<String>,
}

impl ProgressSnapshot {
    /// Completed fraction in `0.0..=1.0`; zero for an empty run.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64).min(1.0)
        }
    }
}
