use crate::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// Conversion into a JSON value for types that opt into being nested inside
/// a [`JsonBuilder`].
pub trait ToJson {
    fn to_json(&self) -> Value;
}

impl ToJson for Value {
    fn to_json(&self) -> Value {
        self.clone()
    }
}

impl ToJson for str {
    fn to_json(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToJson for String {
    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToJson for bool {
    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! number_to_json {
    ($($ty:ty),*) => {
        $(
            impl ToJson for $ty {
                fn to_json(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

number_to_json!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToJson::to_json)
    }
}

impl<T: ToJson> ToJson for [T] {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> Value {
        self.as_slice().to_json()
    }
}

impl<T: ToJson + ?Sized> ToJson for &T {
    fn to_json(&self) -> Value {
        (**self).to_json()
    }
}

/// A JSON object body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonBuilder {
    inner: Map<String, Value>,
}

impl JsonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, converting the value through [`ToJson`].
    pub fn add(mut self, key: impl Into<String>, value: impl ToJson) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToJson) {
        self.inner.insert(key.into(), value.to_json());
    }

    /// Add a key from any serde-serializable value.
    pub fn add_serialize<T: Serialize + ?Sized>(
        mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        self.inner.insert(key.into(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The body as a standalone JSON object.
    pub fn build(&self) -> Value {
        Value::Object(self.inner.clone())
    }
}

impl ToJson for JsonBuilder {
    fn to_json(&self) -> Value {
        self.build()
    }
}
