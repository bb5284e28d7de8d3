//! 请求载荷构建器：JSON、multipart 表单与查询参数。
//!
//! Payload builders handed to the dispatcher.
//!
//! | Builder | Produces |
//! |---------|----------|
//! | [`JsonBuilder`] | a JSON object body |
//! | [`FormBuilder`] | multipart field descriptors |
//! | [`ParamsBuilder`] | encoded query-string pairs |
//!
//! Every builder's `build()` returns an independent copy, so one builder can
//! back several attempts of the same call.

mod form;
mod json;
mod params;

pub(crate) use form::json_field;
pub use form::{FormBuilder, FormField, FormValue, PAYLOAD_JSON_FIELD};
pub use json::{JsonBuilder, ToJson};
pub use params::ParamsBuilder;
