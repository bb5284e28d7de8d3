use crate::client::core::RestClient;
use crate::client::payload::RequestPayload;
use crate::response::Response;
use crate::route::Route;
use crate::Result;
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// A captured call: the route and payload, bound to the client that will send it.
///
/// ```rust,no_run
/// use dapi_rest::{RequestPayload, RestClient, Route};
/// use reqwest::Method;
///
/// # async fn run() -> dapi_rest::Result<()> {
/// let client = RestClient::new("token")?;
/// let pending = client.build_request(
///     Route::new(Method::GET, "/channels/{channel_id}").param("channel_id", 41771983423143937u64),
///     RequestPayload::new(),
/// );
/// assert_eq!(pending.route().path(), "/channels/{channel_id}");
/// let response = pending.await?;
/// # let _ = response;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PendingRequest {
    client: RestClient,
    route: Route,
    payload: RequestPayload,
}

impl PendingRequest {
    pub(crate) fn new(client: RestClient, route: Route, payload: RequestPayload) -> Self {
        Self {
            client,
            route,
            payload,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn payload(&self) -> &RequestPayload {
        &self.payload
    }

    /// Perform the call. Each invocation is an independent request.
    pub async fn send(&self) -> Result<Response> {
        self.client.request(&self.route, &self.payload).await
    }
}

impl IntoFuture for PendingRequest {
    type Output = Result<Response>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.send().await })
    }
}
