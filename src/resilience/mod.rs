//! 限流模块：按桶互斥锁与全局闸门，吸收服务端的限流协议。
//!
//! # Rate Limiting Module
//!
//! The remote API throttles per *bucket* (route shape plus parameter values)
//! and, occasionally, for the whole application. This module holds the state
//! the dispatcher needs to honor both.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BucketTable`] | Lazily created exclusive lock per bucket key, with deferred release |
//! | [`GlobalGate`] | Open/closed signal every request waits on |
//! | [`RateLimiter`] | Both of the above, owned by one client and shared by its clones |
//! | [`headers`] | Parsers for `X-RateLimit-*` headers and 429 bodies |
//!
//! ## Deferred release
//!
//! When a response reports `X-RateLimit-Remaining: 0`, the bucket stays
//! locked until the reported reset. The guard moves into a timer task, so the
//! current caller returns right away and the next caller on that bucket waits.
//!
//! ```rust
//! use dapi_rest::resilience::RateLimiter;
//! use dapi_rest::BucketKey;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let limiter = RateLimiter::new();
//! let key = BucketKey::from("41771983423143937:/channels/{channel_id}/messages");
//!
//! let guard = limiter.acquire_bucket(&key).await;
//! // ... send the request ...
//! limiter.release_bucket(guard, Duration::ZERO);
//! assert_eq!(limiter.snapshot().buckets, 1);
//! # });
//! ```

pub mod bucket;
pub mod global_gate;
pub mod headers;
pub mod rate_limiter;

pub use bucket::{BucketGuard, BucketTable};
pub use global_gate::GlobalGate;
pub use headers::{RateLimitBody, RateLimitHeaders};
pub use rate_limiter::{LimiterSnapshot, RateLimiter};
