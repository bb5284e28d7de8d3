//! End-to-end dispatch over real HTTP against a mockito server.

mod support;

use dapi_rest::builders::{FormBuilder, FormField, JsonBuilder, ParamsBuilder};
use dapi_rest::transport::HttpTransport;
use dapi_rest::{ClientConfig, Error, ErrorBody, RequestPayload, RestClient, Route};
use mockito::Matcher;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use support::mock_server::{MockServerFixture, TOKEN};

#[tokio::test]
async fn test_success_json_response() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response("GET", "/users/@me", 200, r#"{"id":"1","username":"dapi"}"#)
        .await;
    let client = fixture.create_test_client();

    let response = client
        .request(&Route::new(Method::GET, "/users/@me"), &RequestPayload::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.json().unwrap()["username"], "dapi");
}

#[tokio::test]
async fn test_request_headers_and_json_body() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/channels/41771983423143937/messages")
        .match_header("authorization", format!("Bot {TOKEN}").as_str())
        .match_header("user-agent", "dapi-rest-tests")
        .match_header("content-type", "application/json")
        .match_header("x-audit-log-reason", "weekly notice")
        .match_body(Matcher::Json(json!({"content": "hello", "tts": false})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"2"}"#)
        .create_async()
        .await;
    let client = fixture.create_test_client();

    let route = Route::new(Method::POST, "/channels/{channel_id}/messages")
        .param("channel_id", 41771983423143937u64);
    let payload = RequestPayload::new()
        .json(&JsonBuilder::new().add("content", "hello").add("tts", false))
        .reason("weekly notice");
    client.request(&route, &payload).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_query_params_are_sent() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/guilds/9/members/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "nelly & co".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    let client = fixture.create_test_client();

    let route = Route::new(Method::GET, "/guilds/{guild_id}/members/search").param("guild_id", 9);
    let payload = RequestPayload::new().params(&ParamsBuilder::new().add("query", "nelly & co").add("limit", 5));
    let response = client.request(&route, &payload).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.json().unwrap(), &json!([]));
}

#[tokio::test]
async fn test_multipart_carries_payload_json() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/channels/1/messages")
        .match_header("content-type", Matcher::Regex("^multipart/form-data; boundary=".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="files\[0\]"; filename="notes.txt""#.into()),
            Matcher::Regex(r#"name="payload_json""#.into()),
            Matcher::Regex(r#"\{"content":"see attached"\}"#.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;
    let client = fixture.create_test_client();

    let form = FormBuilder::new().add_field(
        FormField::bytes("files[0]", &b"remember the milk"[..])
            .filename("notes.txt")
            .content_type("text/plain"),
    );
    let payload = RequestPayload::new()
        .json(&JsonBuilder::new().add("content", "see attached"))
        .form(&form);
    let route = Route::new(Method::POST, "/channels/{channel_id}/messages").param("channel_id", 1);
    client.request(&route, &payload).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_structured_error_response() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(
            "POST",
            "/channels/1/messages",
            400,
            r#"{"message":"Invalid Form Body","code":50035,"errors":{"content":{"_errors":[{"code":"BASE_TYPE_REQUIRED","message":"This field is required"}]}}}"#,
        )
        .await;
    let client = fixture.create_test_client();

    let route = Route::new(Method::POST, "/channels/{channel_id}/messages").param("channel_id", 1);
    let err = client.request(&route, &RequestPayload::new()).await.unwrap_err();

    let exception = match &err {
        Error::Http(exception) => exception,
        other => panic!("expected HTTP error, got {other:?}"),
    };
    assert_eq!(exception.status(), 400);
    assert_eq!(exception.message(), Some("Invalid Form Body"));
    assert_eq!(exception.errno(), Some(50035));
    assert_eq!(
        exception.errors_text().as_deref(),
        Some("content (BASE_TYPE_REQUIRED): This field is required")
    );
    assert!(!client.rate_limiter().is_bucket_held(&route.bucket_key()));
}

#[tokio::test]
async fn test_non_json_error_body_kept_as_text() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/gateway")
        .with_status(502)
        .with_header("content-type", "text/html")
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;
    let client = fixture.create_test_client();

    let err = client
        .request(&Route::new(Method::GET, "/gateway"), &RequestPayload::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(
        err.http_exception().unwrap().body(),
        &ErrorBody::Text("<html>Bad Gateway</html>".to_string())
    );
}

#[tokio::test]
async fn test_repeated_rate_limits_exhaust_retries() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_rate_limited("/gateway/bot", 0.01, 5).await;
    let client = fixture.create_test_client();

    let route = Route::new(Method::GET, "/gateway/bot");
    let err = client.request(&route, &RequestPayload::new()).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, Error::TooManyRetries { attempts: 5 }));
    assert!(err.http_exception().is_none());
    assert!(!client.rate_limiter().is_bucket_held(&route.bucket_key()));
}

#[tokio::test]
async fn test_exhausted_bucket_delays_next_call() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/channels/7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("x-ratelimit-remaining", "0")
        .with_header("x-ratelimit-reset-after", "0.3")
        .with_header("x-ratelimit-bucket", "abc")
        .with_body("{}")
        .expect(2)
        .create_async()
        .await;
    let client = fixture.create_test_client();
    let route = Route::new(Method::GET, "/channels/{channel_id}").param("channel_id", 7);

    let start = Instant::now();
    client.request(&route, &RequestPayload::new()).await.unwrap();
    let first = start.elapsed();
    client.request(&route, &RequestPayload::new()).await.unwrap();

    assert!(first < Duration::from_millis(300));
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_prebuilt_reqwest_client_is_used() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/gateway")
        .match_header("x-injected", "yes")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url":"wss://gateway.discord.gg"}"#)
        .create_async()
        .await;

    let mut defaults = reqwest::header::HeaderMap::new();
    defaults.insert("x-injected", reqwest::header::HeaderValue::from_static("yes"));
    let http = reqwest::Client::builder().default_headers(defaults).build().unwrap();
    let client = RestClient::builder()
        .token(TOKEN)
        .base_url(&fixture.base_url)
        .transport(Arc::new(HttpTransport::from_client(http)))
        .build()
        .unwrap();

    let response = client
        .request(&Route::new(Method::GET, "/gateway"), &RequestPayload::new())
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(response.json().unwrap()["url"], "wss://gateway.discord.gg");
}

#[tokio::test]
async fn test_zero_timeout_config_never_reaches_the_wire() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/gateway")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let yaml = format!("base_url: {}\nhttp:\n  timeout_secs: 0\n", fixture.base_url);
    let err = ClientConfig::from_yaml_str(&yaml).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));

    let mut config = ClientConfig::default();
    config.base_url = fixture.base_url.clone();
    config.http.timeout_secs = 0;
    assert!(RestClient::builder().token(TOKEN).config(config).build().is_err());
    mock.assert_async().await;
}
