use reqwest::header::HeaderMap;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

pub const REMAINING: &str = "x-ratelimit-remaining";
pub const RESET_AFTER: &str = "x-ratelimit-reset-after";
pub const LIMIT: &str = "x-ratelimit-limit";
pub const BUCKET: &str = "x-ratelimit-bucket";

/// Rate-limit accounting reported on a non-429 response.
///
/// `limit` and `bucket` are only logged; `remaining` and `reset_after`
/// drive the bucket release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub remaining: Option<u64>,
    pub reset_after: Option<Duration>,
    pub limit: Option<u64>,
    pub bucket: Option<String>,
}

impl RateLimitHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            remaining: header_str(headers, REMAINING).and_then(|v| v.parse().ok()),
            reset_after: header_str(headers, RESET_AFTER).and_then(parse_seconds),
            limit: header_str(headers, LIMIT).and_then(|v| v.parse().ok()),
            bucket: header_str(headers, BUCKET).map(str::to_string),
        }
    }

    /// The bucket has no requests left until it resets.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Fractional seconds such as `"1.337"`. Negative or non-finite values are rejected.
pub fn parse_seconds(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Body of a 429 response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateLimitBody {
    #[serde(default)]
    pub global: bool,
    #[serde(deserialize_with = "seconds")]
    pub retry_after: Duration,
}

impl RateLimitBody {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| serde::de::Error::custom(format!("invalid retry_after: {secs}")))
}
