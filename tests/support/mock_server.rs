//! Mock HTTP server setup for integration tests

use dapi_rest::RestClient;
use mockito::{Mock, Server, ServerGuard};

pub const TOKEN: &str = "mock-token";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Create a test client with the mock server as base URL
    pub fn create_test_client(&self) -> RestClient {
        RestClient::builder()
            .token(TOKEN)
            .user_agent("dapi-rest-tests")
            .base_url(&self.base_url)
            .build()
            .expect("client")
    }

    /// Create a mock for a JSON response
    pub async fn mock_json_response(&mut self, method: &str, path: &str, status: u16, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock for a per-route rate limit
    pub async fn mock_rate_limited(&mut self, path: &str, retry_after: f64, hits: usize) -> Mock {
        self.server
            .mock("GET", path)
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"message":"You are being rate limited.","retry_after":{retry_after},"global":false}}"#
            ))
            .expect(hits)
            .create_async()
            .await
    }
}
