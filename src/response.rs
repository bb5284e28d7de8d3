use crate::transport::RawResponse;
use crate::{Error, Result};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::Value;

const JSON_CONTENT_TYPE: &str = "application/json";

/// A successful response from the API.
///
/// The raw body is kept as text; [`Response::json`] decodes it on first use
/// and caches the result.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    body: String,
    content_type: String,
    decoded: OnceCell<Value>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: content_type.into(),
            decoded: OnceCell::new(),
        }
    }

    pub(crate) fn from_raw(raw: RawResponse) -> Self {
        let content_type = raw.content_type().to_string();
        Self::new(raw.status, raw.body, content_type)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// The undecoded body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The body decoded as JSON.
    ///
    /// Fails with [`Error::ContentType`] unless the content type is exactly
    /// `application/json`.
    pub fn json(&self) -> Result<&Value> {
        if self.content_type != JSON_CONTENT_TYPE {
            return Err(Error::ContentType {
                found: self.content_type.clone(),
            });
        }
        self.decoded
            .get_or_try_init(|| serde_json::from_str(&self.body).map_err(Error::from))
    }

    /// The body decoded into a typed value.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(self.json()?)?)
    }
}

impl PartialEq for Response {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.body == other.body
            && self.content_type == other.content_type
    }
}
