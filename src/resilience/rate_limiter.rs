use super::bucket::{BucketGuard, BucketTable};
use super::global_gate::GlobalGate;
use crate::route::BucketKey;
use std::sync::Arc;
use std::time::Duration;

/// Point-in-time facts about a limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterSnapshot {
    /// Distinct buckets seen so far.
    pub buckets: usize,
    pub global_open: bool,
}

/// Per-bucket locks plus the global gate, shared by all clones of one client.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    buckets: Arc<BucketTable>,
    global: GlobalGate,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the caller is the sole holder of `key`. Never times out.
    pub async fn acquire_bucket(&self, key: &BucketKey) -> BucketGuard {
        self.buckets.acquire(key).await
    }

    /// Release now for a zero `delay`, otherwise after `delay` without blocking.
    pub fn release_bucket(&self, guard: BucketGuard, delay: Duration) {
        guard.release_after(delay);
    }

    pub async fn wait_global(&self) {
        self.global.wait().await;
    }

    /// Returns `true` if this call closed the gate.
    pub fn trip_global(&self, duration: Duration) -> bool {
        self.global.trip(duration)
    }

    pub fn is_bucket_held(&self, key: &BucketKey) -> bool {
        self.buckets.is_held(key)
    }

    pub fn snapshot(&self) -> LimiterSnapshot {
        LimiterSnapshot {
            buckets: self.buckets.len(),
            global_open: self.global.is_open(),
        }
    }
}
