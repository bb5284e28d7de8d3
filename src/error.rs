use crate::field_errors::{flatten_errors, FieldError};
use crate::route::TemplateError;
use crate::transport::TransportError;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Structured error context for configuration and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key or field that caused the error (e.g., "http.timeout_secs", "headers.x-audit-log-reason")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the offending value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_config", "request_headers")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of a failed response: decoded JSON when possible, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(Value),
    Text(String),
}

impl ErrorBody {
    /// Decode `text` as JSON, keeping it verbatim if it is not valid JSON.
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => ErrorBody::Json(value),
            Err(_) => ErrorBody::Text(text),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ErrorBody::Json(value) => Some(value),
            ErrorBody::Text(_) => None,
        }
    }
}

/// A terminal non-success response from the API.
///
/// Everything beyond the status and body is derived on demand from the body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpException {
    status: u16,
    body: ErrorBody,
}

impl HttpException {
    pub fn new(status: u16, body: ErrorBody) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &ErrorBody {
        &self.body
    }

    /// Error message sent by the server.
    pub fn message(&self) -> Option<&str> {
        self.body.as_json()?.get("message")?.as_str()
    }

    /// Numeric error code assigned by the server (not the HTTP status).
    pub fn errno(&self) -> Option<i64> {
        self.body.as_json()?.get("code")?.as_i64()
    }

    /// Per-field validation errors, flattened. Empty when the body carries none.
    pub fn errors(&self) -> Vec<FieldError> {
        self.body
            .as_json()
            .and_then(|body| body.get("errors"))
            .map(flatten_errors)
            .unwrap_or_default()
    }

    /// Field errors as `path (code): message` lines, or the raw body when it
    /// was not JSON. `None` for a JSON body without an `errors` member.
    pub fn errors_text(&self) -> Option<String> {
        match &self.body {
            ErrorBody::Text(text) => Some(text.clone()),
            ErrorBody::Json(body) => {
                let errors = body.get("errors")?;
                let text = flatten_errors(errors)
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n");
                Some(text.trim().to_string())
            }
        }
    }
}

impl fmt::Display for HttpException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(message) = self.message() {
            write!(f, ": {message}")?;
        }
        if let Some(errno) = self.errno() {
            write!(f, " ({errno})")?;
        }
        if let Some(errors) = self.errors_text().filter(|text| !text.is_empty()) {
            write!(f, "\n{errors}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpException {}

/// Unified error type for the REST client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Route template error: {0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Http(#[from] HttpException),

    #[error("Rate limit response could not be decoded ({response}): {source}")]
    RateLimitDecode {
        response: HttpException,
        #[source]
        source: serde_json::Error,
    },

    #[error("Maximum retry limit reached after {attempts} attempts")]
    TooManyRetries { attempts: usize },

    #[error("Content type must be `application/json`, not `{found}`")]
    ContentType { found: String },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// The server response behind this error, if it came from one.
    pub fn http_exception(&self) -> Option<&HttpException> {
        match self {
            Error::Http(exception) => Some(exception),
            Error::RateLimitDecode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// HTTP status of the response behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        self.http_exception().map(HttpException::status)
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}
