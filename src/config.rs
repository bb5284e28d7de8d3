//! 客户端配置：默认值、YAML 文件与 DAPI_* 环境变量。
//!
//! Client configuration.
//!
//! Values come from three layers, later ones winning: the defaults below, an
//! optional YAML document, and `DAPI_*` environment variables. The resulting
//! [`ClientConfig`] is handed to
//! [`RestClientBuilder::config`](crate::RestClientBuilder::config).
//!
//! ```yaml
//! base_url: https://discord.com/api/v10
//! http:
//!   timeout_secs: 15
//!   proxy_url: http://127.0.0.1:3128
//! ```

use crate::route::API_BASE_URL;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 32;
const DEFAULT_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// User agent in the form the API asks bots to send.
pub fn default_user_agent() -> String {
    format!(
        "DiscordBot (https://github.com/AnimateShadows/dapi, {})",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_base_url() -> String {
    API_BASE_URL.to_string()
}

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            http: HttpConfig::default(),
        }
    }
}

/// Connection pool and timeout knobs for the reqwest transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    #[serde(default = "default_pool_idle_timeout_secs")]
    pub pool_idle_timeout_secs: u64,

    #[serde(default)]
    pub proxy_url: Option<String>,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_pool_max_idle_per_host() -> usize {
    DEFAULT_POOL_MAX_IDLE_PER_HOST
}

const fn default_pool_idle_timeout_secs() -> u64 {
    DEFAULT_POOL_IDLE_TIMEOUT_SECS
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout_secs: DEFAULT_POOL_IDLE_TIMEOUT_SECS,
            proxy_url: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }

    /// A zero timeout would fail every request before it is sent.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(zero_timeout("http.timeout_secs", "client_config"));
        }
        Ok(())
    }
}

fn zero_timeout(field_path: &str, source: &str) -> Error {
    Error::configuration_with_context(
        "request timeout must be at least one second",
        ErrorContext::new()
            .with_field_path(field_path)
            .with_details("0")
            .with_source(source),
    )
}

impl ClientConfig {
    /// Parse a YAML document. Missing keys fall back to defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                "invalid client configuration",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("client_config"),
            )
        })?;
        config.http.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                "unable to read client configuration",
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_details(e.to_string())
                    .with_source("client_config"),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Overlay `DAPI_*` environment variables onto this configuration.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| env::var(name).ok())
    }

    pub(crate) fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if let Some(base_url) = lookup("DAPI_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(user_agent) = lookup("DAPI_USER_AGENT") {
            self.user_agent = user_agent;
        }
        if let Some(raw) = lookup("DAPI_HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = parse_var("DAPI_HTTP_TIMEOUT_SECS", &raw)?;
            if self.http.timeout_secs == 0 {
                return Err(zero_timeout("DAPI_HTTP_TIMEOUT_SECS", "environment"));
            }
        }
        if let Some(raw) = lookup("DAPI_HTTP_POOL_MAX_IDLE_PER_HOST") {
            self.http.pool_max_idle_per_host = parse_var("DAPI_HTTP_POOL_MAX_IDLE_PER_HOST", &raw)?;
        }
        if let Some(raw) = lookup("DAPI_HTTP_POOL_IDLE_TIMEOUT_SECS") {
            self.http.pool_idle_timeout_secs = parse_var("DAPI_HTTP_POOL_IDLE_TIMEOUT_SECS", &raw)?;
        }
        if let Some(proxy_url) = lookup("DAPI_PROXY_URL") {
            self.http.proxy_url = Some(proxy_url);
        }
        Ok(self)
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        Error::configuration_with_context(
            format!("invalid value for {name}"),
            ErrorContext::new()
                .with_field_path(name)
                .with_details(format!("`{raw}`: {e}"))
                .with_source("environment"),
        )
    })
}
