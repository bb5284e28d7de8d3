use crate::route::BucketKey;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Table of per-bucket exclusive locks, created on first use.
///
/// Entries are never removed; the table grows with the number of distinct
/// buckets ever called.
#[derive(Debug, Default)]
pub struct BucketTable {
    locks: DashMap<BucketKey, Arc<Mutex<()>>>,
}

impl BucketTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the caller is the sole holder of `key`'s lock.
    pub async fn acquire(&self, key: &BucketKey) -> BucketGuard {
        // Clone the lock out; no map shard may be held across the await.
        let lock = self.locks.entry(key.clone()).or_default().clone();
        let permit = lock.lock_owned().await;
        BucketGuard {
            key: key.clone(),
            permit,
        }
    }

    /// Number of buckets seen so far.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Whether `key` is currently held (including pending deferred releases).
    pub fn is_held(&self, key: &BucketKey) -> bool {
        self.locks
            .get(key)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }
}

/// Exclusive hold on one bucket. Dropping the guard releases the bucket.
#[derive(Debug)]
pub struct BucketGuard {
    key: BucketKey,
    permit: OwnedMutexGuard<()>,
}

impl BucketGuard {
    pub fn key(&self) -> &BucketKey {
        &self.key
    }

    pub fn release(self) {
        drop(self);
    }

    /// Hand the bucket to a timer task that releases it after `delay`.
    ///
    /// Returns immediately. A zero delay releases on the spot.
    pub fn release_after(self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        debug!(
            bucket = self.key.as_str(),
            delay_ms = delay.as_millis() as u64,
            "bucket exhausted, deferring release"
        );
        let BucketGuard { key, permit } = self;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            drop(permit);
            debug!(bucket = key.as_str(), "deferred bucket release");
        });
    }
}
