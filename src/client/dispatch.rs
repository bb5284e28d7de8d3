//! 请求分发逻辑：桶锁、全局闸门与 429 重试循环。
//!
//! Request dispatch: one logical call, up to [`MAX_ATTEMPTS`] wire attempts.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::core::RestClient;
use super::payload::RequestPayload;
use crate::error::{ErrorBody, HttpException};
use crate::resilience::headers::{RateLimitBody, RateLimitHeaders};
use crate::resilience::BucketGuard;
use crate::response::Response;
use crate::route::{BucketKey, Route};
use crate::transport::{OutgoingRequest, RawResponse, RequestBody};
use crate::{Error, ErrorContext, Result};

/// Wire attempts per logical call before giving up on repeated 429s.
pub const MAX_ATTEMPTS: usize = 5;

const AUDIT_LOG_REASON: &str = "x-audit-log-reason";

/// What one wire attempt means for the call.
#[derive(Debug)]
pub(crate) enum AttemptOutcome {
    /// Rate limited: sleep `after` and try again while keeping the bucket.
    Retry { after: Duration, global: bool },
    Success(Response),
    Failure(Error),
}

/// Interpret one response. Also returns how long the bucket must stay held
/// once the call ends; meaningless for [`AttemptOutcome::Retry`].
pub(crate) fn evaluate(raw: RawResponse, bucket: &BucketKey) -> (AttemptOutcome, Duration) {
    if raw.status == 429 {
        return match RateLimitBody::parse(&raw.body) {
            Ok(limit) => (
                AttemptOutcome::Retry {
                    after: limit.retry_after,
                    global: limit.global,
                },
                Duration::ZERO,
            ),
            Err(source) => (
                AttemptOutcome::Failure(Error::RateLimitDecode {
                    response: HttpException::new(429, ErrorBody::Text(raw.body)),
                    source,
                }),
                Duration::ZERO,
            ),
        };
    }

    let limits = RateLimitHeaders::from_headers(&raw.headers);
    if limits.bucket.is_some() || limits.limit.is_some() {
        debug!(
            bucket = bucket.as_str(),
            server_bucket = limits.bucket.as_deref(),
            limit = limits.limit,
            remaining = limits.remaining,
            "rate limit accounting"
        );
    }
    let hold = match (limits.is_exhausted(), limits.reset_after) {
        (false, _) => Duration::ZERO,
        (true, Some(reset_after)) => reset_after,
        (true, None) => {
            warn!(
                bucket = bucket.as_str(),
                "bucket exhausted without a usable reset-after, releasing now"
            );
            Duration::ZERO
        }
    };

    let outcome = if raw.is_success() {
        AttemptOutcome::Success(Response::from_raw(raw))
    } else {
        let status = raw.status;
        AttemptOutcome::Failure(Error::Http(HttpException::new(
            status,
            ErrorBody::from_text(raw.body),
        )))
    };
    (outcome, hold)
}

fn header_error(message: &str, name: &str, details: impl ToString) -> Error {
    Error::validation_with_context(
        message,
        ErrorContext::new()
            .with_field_path(format!("headers.{}", name.to_ascii_lowercase()))
            .with_details(details.to_string())
            .with_source("request_payload"),
    )
}

impl RestClient {
    /// Send `route` with `payload`, absorbing transient rate limits.
    ///
    /// Template errors surface before any bucket is acquired. A terminal
    /// non-2xx response becomes [`Error::Http`]; five rate-limited attempts in
    /// a row become [`Error::TooManyRetries`].
    pub async fn request(&self, route: &Route, payload: &RequestPayload) -> Result<Response> {
        let url = route.url_with_base(&self.inner.base_url)?;
        let body = payload.body();
        let headers = self.build_headers(payload, &body)?;
        let request = OutgoingRequest {
            method: route.method().clone(),
            url,
            headers,
            query: payload.query().to_vec(),
            body,
        };

        let bucket = route.bucket_key();
        let request_id = Uuid::new_v4().to_string();
        let guard = self.inner.limiter.acquire_bucket(&bucket).await;
        self.inner.limiter.wait_global().await;

        self.dispatch(request, guard, &request_id).await
    }

    pub(crate) fn build_headers(
        &self,
        payload: &RequestPayload,
        body: &RequestBody,
    ) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in payload.extra_headers() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| header_error("invalid header name", name, e))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| header_error("invalid header value", name, e))?;
            headers.insert(header_name, header_value);
        }

        let auth = HeaderValue::from_str(&format!("Bot {}", self.inner.token))
            .map_err(|e| header_error("token is not a valid header value", "authorization", e))?;
        headers.insert(AUTHORIZATION, auth);

        let agent = HeaderValue::from_str(&self.inner.user_agent)
            .map_err(|e| header_error("invalid user agent", "user-agent", e))?;
        headers.insert(USER_AGENT, agent);

        match body {
            RequestBody::Json(_) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            // The form encoder sets multipart/form-data with its boundary.
            RequestBody::Form(_) => {
                headers.remove(CONTENT_TYPE);
            }
            RequestBody::Empty => {}
        }

        if let Some(reason) = payload.audit_reason() {
            let reason = HeaderValue::from_str(reason)
                .map_err(|e| header_error("invalid audit log reason", AUDIT_LOG_REASON, e))?;
            headers.insert(HeaderName::from_static(AUDIT_LOG_REASON), reason);
        }

        Ok(headers)
    }

    async fn dispatch(
        &self,
        request: OutgoingRequest,
        guard: BucketGuard,
        request_id: &str,
    ) -> Result<Response> {
        let start = Instant::now();
        let method = request.method.clone();

        for attempt in 1..=MAX_ATTEMPTS {
            // A transport error drops the guard, which releases the bucket.
            let raw = self.inner.transport.send(request.clone()).await?;
            let status = raw.status;

            match evaluate(raw, guard.key()) {
                (AttemptOutcome::Retry { after, global }, _) => {
                    if global {
                        self.inner.limiter.trip_global(after);
                    }
                    debug!(
                        request_id,
                        bucket = guard.key().as_str(),
                        attempt,
                        global,
                        retry_after_ms = after.as_millis() as u64,
                        "rate limited, retrying"
                    );
                    tokio::time::sleep(after).await;
                }
                (AttemptOutcome::Success(response), hold) => {
                    debug!(
                        request_id,
                        method = %method,
                        bucket = guard.key().as_str(),
                        status,
                        attempt,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "request completed"
                    );
                    self.inner.limiter.release_bucket(guard, hold);
                    return Ok(response);
                }
                (AttemptOutcome::Failure(error), hold) => {
                    info!(
                        request_id,
                        method = %method,
                        bucket = guard.key().as_str(),
                        status,
                        attempt,
                        duration_ms = start.elapsed().as_millis() as u64,
                        error = %error,
                        "request failed"
                    );
                    self.inner.limiter.release_bucket(guard, hold);
                    return Err(error);
                }
            }
        }

        warn!(
            request_id,
            method = %method,
            bucket = guard.key().as_str(),
            attempts = MAX_ATTEMPTS,
            "retry budget exhausted"
        );
        Err(Error::TooManyRetries {
            attempts: MAX_ATTEMPTS,
        })
    }
}
