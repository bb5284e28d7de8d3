use crate::builders::{json_field, FormBuilder, FormField, JsonBuilder, ParamsBuilder};
use crate::transport::RequestBody;
use serde_json::Value;

/// Everything sent with a route besides the URL: body, query, audit reason
/// and extra headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPayload {
    json: Option<Value>,
    form: Option<Vec<FormField>>,
    params: Vec<(String, String)>,
    reason: Option<String>,
    headers: Vec<(String, String)>,
}

impl RequestPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, json: &JsonBuilder) -> Self {
        self.json = Some(json.build());
        self
    }

    pub fn json_value(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    pub fn form(mut self, form: &FormBuilder) -> Self {
        self.form = Some(form.build());
        self
    }

    pub fn params(mut self, params: &ParamsBuilder) -> Self {
        self.params = params.build();
        self
    }

    /// Value for `X-Audit-Log-Reason` on endpoints that record one.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Extra header. Client-managed headers such as `Authorization` win over these.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json_body(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    pub fn form_fields(&self) -> Option<&[FormField]> {
        self.form.as_deref()
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn audit_reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The body to send. A form wins over JSON; the JSON then travels inside
    /// the form as its `payload_json` field.
    pub(crate) fn body(&self) -> RequestBody {
        match (&self.form, &self.json) {
            (Some(fields), json) => {
                let mut fields = fields.clone();
                if let Some(json) = json {
                    fields.push(json_field(json));
                }
                RequestBody::Form(fields)
            }
            (None, Some(json)) => RequestBody::Json(json.clone()),
            (None, None) => RequestBody::Empty,
        }
    }
}
