use crate::client::core::{ClientInner, RestClient};
use crate::config::ClientConfig;
use crate::resilience::RateLimiter;
use crate::transport::{HttpTransport, Transport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Keep this surface area small and predictable (developer-friendly).
#[derive(Default)]
pub struct RestClientBuilder {
    token: Option<String>,
    config: ClientConfig,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl RestClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bot token, sent as `Authorization: Bot <token>`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace the whole configuration (e.g. one loaded from YAML or env).
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Override the API base URL.
    ///
    /// This is primarily for testing with mock servers.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Whole-request timeout. Takes precedence over `http.timeout_secs` and
    /// keeps sub-second precision; a zero duration fails [`build`](Self::build).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.config.http.pool_max_idle_per_host = n;
        self
    }

    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.http.proxy_url = Some(proxy_url.into());
        self
    }

    /// Inject a transport. HTTP settings in the configuration are then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RestClient> {
        let token = self
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "a bot token is required",
                    ErrorContext::new()
                        .with_field_path("token")
                        .with_source("client_builder"),
                )
            })?;

        let base_url = self.config.base_url.trim_end_matches('/').to_string();
        if url::Url::parse(&base_url).is_err() {
            return Err(Error::configuration_with_context(
                "base URL is not a valid absolute URL",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(base_url)
                    .with_source("client_builder"),
            ));
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => match self.timeout {
                Some(timeout) => Arc::new(HttpTransport::with_timeout(&self.config.http, timeout)?),
                None => Arc::new(HttpTransport::new(&self.config.http)?),
            },
        };

        Ok(RestClient {
            inner: Arc::new(ClientInner {
                token,
                user_agent: self.config.user_agent,
                base_url,
                transport,
                limiter: RateLimiter::new(),
            }),
        })
    }
}
