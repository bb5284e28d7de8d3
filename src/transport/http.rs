use crate::builders::{FormField, FormValue};
use crate::config::HttpConfig;
use crate::transport::{OutgoingRequest, RawResponse, RequestBody, Transport, TransportError};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Proxy;
use std::time::Duration;

/// reqwest-backed [`Transport`] sharing one connection pool across all calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        config.validate()?;
        Self::with_timeout(config, config.timeout())
    }

    /// Same as [`HttpTransport::new`] with a timeout finer than whole seconds.
    pub fn with_timeout(config: &HttpConfig, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::configuration_with_context(
                "request timeout must be positive",
                ErrorContext::new()
                    .with_field_path("http.timeout")
                    .with_source("http_transport"),
            ));
        }
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout()));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    "invalid proxy URL",
                    ErrorContext::new()
                        .with_field_path("http.proxy_url")
                        .with_details(e.to_string())
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client })
    }

    /// Wrap an already configured reqwest client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutgoingRequest) -> std::result::Result<RawResponse, TransportError> {
        let url = request.full_url();
        let mut builder = self
            .client
            .request(request.method, url)
            .headers(request.headers);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            // reqwest sets `multipart/form-data; boundary=...` itself
            RequestBody::Form(fields) => builder.multipart(multipart(fields)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn multipart(fields: Vec<FormField>) -> std::result::Result<Form, TransportError> {
    let mut form = Form::new();
    for field in fields {
        let mut part = match field.value {
            FormValue::Text(text) => Part::text(text),
            FormValue::Bytes(bytes) => Part::bytes(bytes.to_vec()),
        };
        part = part.mime_str(&field.content_type)?;
        if let Some(filename) = field.filename {
            part = part.file_name(filename);
        }
        if let Some(encoding) = field.content_transfer_encoding {
            let value = HeaderValue::from_str(&encoding).map_err(|e| {
                TransportError::Other(format!(
                    "invalid content transfer encoding `{encoding}` for field `{}`: {e}",
                    field.name
                ))
            })?;
            let mut headers = HeaderMap::new();
            headers.insert(HeaderName::from_static("content-transfer-encoding"), value);
            part = part.headers(headers);
        }
        form = form.part(field.name, part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_from_default_config() {
        assert!(HttpTransport::new(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_transport_rejects_zero_timeout() {
        let config = HttpConfig {
            timeout_secs: 0,
            ..HttpConfig::default()
        };
        let err = HttpTransport::new(&config).unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("http.timeout_secs")
        );

        let err = HttpTransport::with_timeout(&HttpConfig::default(), Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(HttpTransport::with_timeout(&HttpConfig::default(), Duration::from_millis(250)).is_ok());
    }

    #[test]
    fn test_transport_rejects_bad_proxy() {
        let config = HttpConfig {
            proxy_url: Some("http://[::1".to_string()),
            ..HttpConfig::default()
        };
        let err = HttpTransport::new(&config).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_multipart_rejects_bad_mime() {
        let field = FormField::text("file", "x").content_type("not a mime");
        assert!(multipart(vec![field]).is_err());
    }

    #[test]
    fn test_multipart_accepts_descriptors() {
        let fields = vec![
            FormField::text("payload_json", "{}").content_type("application/json"),
            FormField::bytes("files[0]", vec![1u8, 2, 3])
                .filename("a.bin")
                .content_transfer_encoding("binary"),
        ];
        assert!(multipart(fields).is_ok());
    }
}
