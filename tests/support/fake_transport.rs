//! Scripted in-process transport for timing tests under a paused tokio clock.

use async_trait::async_trait;
use dapi_rest::transport::{OutgoingRequest, RawResponse, Transport, TransportError};
use dapi_rest::RestClient;
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub const BASE_URL: &str = "http://fake.test";

/// One wire attempt as seen by the transport.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub path: String,
    pub request: OutgoingRequest,
    pub entered: Instant,
    pub exited: Instant,
}

#[derive(Default)]
struct State {
    scripts: HashMap<String, VecDeque<RawResponse>>,
    exchanges: Vec<Exchange>,
}

/// Replies per URL path from a queue of scripted responses, falling back to
/// an empty `200 application/json` object once the queue runs dry.
pub struct FakeTransport {
    latency: Duration,
    state: Mutex<State>,
}

impl FakeTransport {
    pub fn new(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            state: Mutex::new(State::default()),
        })
    }

    pub fn script(&self, path: &str, responses: impl IntoIterator<Item = RawResponse>) {
        let mut state = self.state.lock().unwrap();
        state
            .scripts
            .entry(path.to_string())
            .or_default()
            .extend(responses);
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.state.lock().unwrap().exchanges.clone()
    }

    pub fn exchanges_for(&self, path: &str) -> Vec<Exchange> {
        self.exchanges()
            .into_iter()
            .filter(|e| e.path == path)
            .collect()
    }

    pub fn client(self: &Arc<Self>) -> RestClient {
        RestClient::builder()
            .token("test-token")
            .base_url(BASE_URL)
            .transport(self.clone())
            .build()
            .unwrap()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        let entered = Instant::now();
        let path = request
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(&request.url)
            .to_string();

        tokio::time::sleep(self.latency).await;

        let mut state = self.state.lock().unwrap();
        let response = state
            .scripts
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| json(200, "{}"));
        state.exchanges.push(Exchange {
            path,
            request,
            entered,
            exited: Instant::now(),
        });
        Ok(response)
    }
}

pub fn json(status: u16, body: &str) -> RawResponse {
    with_header(RawResponse::new(status, body), "content-type", "application/json")
}

pub fn rate_limited(retry_after: f64, global: bool) -> RawResponse {
    json(
        429,
        &format!(
            r#"{{"message":"You are being rate limited.","retry_after":{retry_after},"global":{global}}}"#
        ),
    )
}

pub fn exhausted(reset_after: &str) -> RawResponse {
    let response = with_header(json(200, "{}"), "x-ratelimit-remaining", "0");
    with_header(response, "x-ratelimit-reset-after", reset_after)
}

pub fn with_header(response: RawResponse, name: &'static str, value: &str) -> RawResponse {
    response.with_header(
        HeaderName::from_static(name),
        HeaderValue::from_str(value).unwrap(),
    )
}
