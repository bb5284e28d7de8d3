//! # dapi-rest
//!
//! 面向 Discord REST API 的限流感知 HTTP 客户端，透明处理桶限流与全局限流。
//!
//! Rate-limit aware HTTP client for the Discord REST API.
//!
//! ## Overview
//!
//! Callers describe *what* to call with a [`Route`] and a [`RequestPayload`];
//! the [`RestClient`] takes care of *when*. Every route maps to a rate-limit
//! bucket, calls on the same bucket are serialized, exhausted buckets stay
//! locked until their reported reset, and a globally rate-limited response
//! suspends every call until the server says otherwise.
//!
//! ## Key Features
//!
//! - **Bucket accounting**: [`Route::bucket_key`] plus per-bucket locks in [`resilience`]
//! - **Transparent 429 handling**: retries with the server's `retry_after`, up to [`client::MAX_ATTEMPTS`]
//! - **Structured errors**: [`HttpException`] flattens nested validation errors into [`FieldError`]s
//! - **Payload builders**: JSON, multipart forms and query strings via [`builders`]
//! - **Deferred calls**: [`PendingRequest`] can be inspected, re-sent or awaited
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dapi_rest::builders::JsonBuilder;
//! use dapi_rest::{RequestPayload, RestClient, Route};
//! use reqwest::Method;
//!
//! #[tokio::main]
//! async fn main() -> dapi_rest::Result<()> {
//!     let client = RestClient::new(std::env::var("DAPI_TOKEN").unwrap_or_default())?;
//!
//!     let route = Route::new(Method::POST, "/channels/{channel_id}/messages")
//!         .param("channel_id", 41771983423143937u64);
//!     let payload = RequestPayload::new().json(&JsonBuilder::new().add("content", "Hello!"));
//!
//!     let response = client.request(&route, &payload).await?;
//!     println!("{}", response.json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`route`] | Routes, URL interpolation and bucket keys |
//! | [`client`] | The client, its builder and the dispatch loop |
//! | [`resilience`] | Bucket locks and the global gate |
//! | [`builders`] | JSON, form and query payload builders |
//! | [`response`] | Successful responses with cached JSON decoding |
//! | [`transport`] | The HTTP seam and its reqwest implementation |
//! | [`config`] | YAML and environment configuration |
//! | [`field_errors`] | Flattening of nested validation errors |

pub mod builders;
pub mod client;
pub mod config;
pub mod field_errors;
pub mod resilience;
pub mod response;
pub mod route;
pub mod transport;

// Re-export main types for convenience
pub use client::{PendingRequest, RequestPayload, RestClient, RestClientBuilder};
pub use config::ClientConfig;
pub use error::{ErrorBody, HttpException};
pub use field_errors::{flatten_errors, FieldError};
pub use response::Response;
pub use route::{BucketKey, Route, TemplateError};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
