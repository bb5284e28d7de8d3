//! 路由模块：方法、路径模板、参数插值与限流桶键。
//!
//! Routes: one logical endpoint of the REST API.
//!
//! A [`Route`] pairs an HTTP method with a path template such as
//! `/channels/{channel_id}/messages` and the values of its named parameters.
//! It derives two things from that: the interpolated URL, and the
//! [`BucketKey`] that decides which rate-limit bucket the call falls into.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Versioned base URL every route is resolved against by default.
pub const API_BASE_URL: &str = "https://discord.com/api/v10";

/// Matches escaped braces and `{name}` placeholders. Anything else with a
/// brace in it is reported as unbalanced.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("placeholder regex is valid"));

/// Failure to interpolate a route's path template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("path `{path}` has placeholder `{{{name}}}` but no parameter named `{name}`")]
    MissingParameter { name: String, path: String },

    #[error("path `{path}` has an unbalanced brace at byte {position}")]
    UnbalancedBrace { path: String, position: usize },
}

/// Rate-limit scope of a route.
///
/// Routes sharing a path template and the same parameter values share a key,
/// which mirrors how the server scopes limits per route shape and major
/// parameter rather than per literal URL.
///
/// ```
/// use dapi_rest::Route;
/// use reqwest::Method;
///
/// let a = Route::new(Method::GET, "/channels/{channel_id}").param("channel_id", 41771983423143937u64);
/// let b = Route::new(Method::PATCH, "/channels/{channel_id}").param("channel_id", 41771983423143937u64);
/// assert_eq!(a.bucket_key(), b.bucket_key());
/// assert_eq!(a.bucket_key().as_str(), "41771983423143937:/channels/{channel_id}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey(String);

impl BucketKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BucketKey {
    fn from(key: String) -> Self {
        BucketKey(key)
    }
}

impl From<&str> for BucketKey {
    fn from(key: &str) -> Self {
        BucketKey(key.to_string())
    }
}

/// A single endpoint call target: method, path template and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: Method,
    path: String,
    /// Sorted by key so the bucket key is deterministic.
    params: BTreeMap<String, String>,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    /// Set a path parameter. Values are string-coerced on insertion.
    pub fn param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The raw, uninterpolated path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Interpolated URL against [`API_BASE_URL`].
    pub fn url(&self) -> Result<String, TemplateError> {
        self.url_with_base(API_BASE_URL)
    }

    /// Interpolated URL against an arbitrary base (mock servers, proxies).
    pub fn url_with_base(&self, base: &str) -> Result<String, TemplateError> {
        let mut url = String::with_capacity(base.len() + self.path.len());
        url.push_str(base.trim_end_matches('/'));

        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(&self.path) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            url.push_str(&self.path[last..whole.start()]);
            last = whole.end();

            match whole.as_str() {
                "{{" => url.push('{'),
                "}}" => url.push('}'),
                "{" | "}" => {
                    return Err(TemplateError::UnbalancedBrace {
                        path: self.path.clone(),
                        position: whole.start(),
                    })
                }
                _ => {
                    let name = caps.get(1).map_or("", |m| m.as_str());
                    let value =
                        self.params
                            .get(name)
                            .ok_or_else(|| TemplateError::MissingParameter {
                                name: name.to_string(),
                                path: self.path.clone(),
                            })?;
                    url.push_str(value);
                }
            }
        }
        url.push_str(&self.path[last..]);

        Ok(url)
    }

    /// The rate-limit bucket this route falls into: the parameter values in
    /// key order, then the raw template, all joined with `:`.
    pub fn bucket_key(&self) -> BucketKey {
        let mut key = self
            .params
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(":");
        key.push(':');
        key.push_str(&self.path);
        BucketKey(key)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
