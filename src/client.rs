//! 统一 REST 客户端接口：请求分发、载荷与延迟调用。
//!
//! Rate-limit aware REST client.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
mod dispatch;
pub mod payload;
pub mod pending;
pub mod signals;

pub use builder::RestClientBuilder;
pub use core::RestClient;
pub use dispatch::MAX_ATTEMPTS;
pub use payload::RequestPayload;
pub use pending::PendingRequest;
pub use signals::SignalsSnapshot;
