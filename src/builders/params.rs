use std::fmt;
use url::form_urlencoded;

/// Query-string parameters. Keys and values are stored already encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamsBuilder {
    inner: Vec<(String, String)>,
}

fn encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

impl ParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing an earlier value for the same key.
    pub fn add(mut self, key: &str, value: impl fmt::Display) -> Self {
        let key = encode(key);
        let value = encode(&value.to_string());
        match self.inner.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.inner.push((key, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn build(&self) -> Vec<(String, String)> {
        self.inner.clone()
    }
}
