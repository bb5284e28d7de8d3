use bytes::Bytes;
use serde_json::Value;

/// Name of the form field that carries the JSON part of a multipart body.
pub const PAYLOAD_JSON_FIELD: &str = "payload_json";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Value of a multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Bytes(Bytes),
}

/// Descriptor of one multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
    pub content_type: String,
    pub filename: Option<String>,
    pub content_transfer_encoding: Option<String>,
}

impl FormField {
    fn new(name: impl Into<String>, value: FormValue) -> Self {
        Self {
            name: name.into(),
            value,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            filename: None,
            content_transfer_encoding: None,
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, FormValue::Text(value.into()))
    }

    pub fn bytes(name: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self::new(name, FormValue::Bytes(value.into()))
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn content_transfer_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.content_transfer_encoding = Some(encoding.into());
        self
    }
}

/// A multipart form body, e.g. a message with attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBuilder {
    fields: Vec<FormField>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Attach a JSON document as the `payload_json` field.
    pub fn add_json(self, json: &Value) -> Self {
        self.add_field(json_field(json))
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// The field descriptors in insertion order.
    pub fn build(&self) -> Vec<FormField> {
        self.fields.clone()
    }
}

pub(crate) fn json_field(json: &Value) -> FormField {
    FormField::text(PAYLOAD_JSON_FIELD, json.to_string()).content_type("application/json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_field_defaults() {
        let field = FormField::bytes("files[0]", vec![0u8; 4]);
        assert_eq!(field.content_type, "application/octet-stream");
        assert_eq!(field.filename, None);
        assert_eq!(field.content_transfer_encoding, None);
    }

    #[test]
    fn test_form_builder_fields_in_order() {
        let form = FormBuilder::new()
            .add_field(FormField::bytes("files[0]", &b"png"[..]).filename("a.png").content_type("image/png"))
            .add_json(&json!({"content": "hi"}));
        let fields = form.build();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].filename.as_deref(), Some("a.png"));
        assert_eq!(fields[0].value, FormValue::Bytes(Bytes::from_static(b"png")));
        assert_eq!(fields[1].name, PAYLOAD_JSON_FIELD);
        assert_eq!(fields[1].content_type, "application/json");
        assert_eq!(fields[1].value, FormValue::Text(r#"{"content":"hi"}"#.to_string()));
    }
}
