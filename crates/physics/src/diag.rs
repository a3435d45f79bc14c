//! Log-once latches for conditions that would otherwise spam every tick.

use std::sync::atomic::{AtomicBool, Ordering};

/// Fires the first time it is tripped and stays quiet until re-armed.
#[derive(Debug, Default)]
pub struct WarnOnce {
    tripped: AtomicBool,
}

impl WarnOnce {
    pub const fn new() -> Self {
        Self {
            tripped: AtomicBool::new(false),
        }
    }

    /// Returns `true` only on the first call since construction or the last [`reset`](Self::reset).
    pub fn trip(&self) -> bool {
        !self.tripped.swap(true, Ordering::Relaxed)
    }

    /// Re-arm after the condition cleared.
    pub fn reset(&self) {
        self.tripped.store(false, Ordering::Relaxed);
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Relaxed)
    }
}

/// Log a warning through `tracing` at most once per latch.
#[macro_export]
macro_rules! warn_once {
    ($latch:expr, $($arg:tt)+) => {
        if $latch.trip() {
            ::tracing::warn!($($arg)+);
        }
    };
}
