use crate::client::builder::RestClientBuilder;
use crate::client::payload::RequestPayload;
use crate::client::pending::PendingRequest;
use crate::client::signals::SignalsSnapshot;
use crate::resilience::RateLimiter;
use crate::route::Route;
use crate::transport::Transport;
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Rate-limit aware client for the REST API.
///
/// Cloning is cheap; clones share the connection pool, the bucket table and
/// the global gate. Separately built clients never share limiter state.
#[derive(Clone)]
pub struct RestClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) token: String,
    pub(crate) user_agent: String,
    pub(crate) base_url: String,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) limiter: RateLimiter,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.inner.base_url)
            .field("user_agent", &self.inner.user_agent)
            .field("limiter", &self.inner.limiter.snapshot())
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Client with default configuration for a bot token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        RestClientBuilder::new().token(token).build()
    }

    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.inner.user_agent
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    /// Snapshot current limiter state (facts only).
    pub fn signals(&self) -> SignalsSnapshot {
        SignalsSnapshot {
            rate_limiter: self.inner.limiter.snapshot(),
        }
    }

    /// Capture a call without sending it. The result can be inspected, sent
    /// any number of times, or awaited directly.
    pub fn build_request(&self, route: Route, payload: RequestPayload) -> PendingRequest {
        PendingRequest::new(self.clone(), route, payload)
    }
}
