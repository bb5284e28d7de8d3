//! 错误归一化：将嵌套的字段校验错误展平为 (路径, 消息, 代码)。
//!
//! Flattening of the server's nested validation-error payload.
//!
//! Invalid form bodies come back as a tree that mirrors the request shape,
//! with `_errors` arrays at the offending leaves:
//!
//! ```json
//! {"embeds": [{"url": {"_errors": [{"code": "URL_TYPE_INVALID_URL", "message": "Not a well formed URL."}]}}]}
//! ```
//!
//! [`flatten_errors`] turns that into a linear list of [`FieldError`]s whose
//! `path` is the colon-joined route to the leaf (`embeds:0:url`).

use serde_json::Value;
use std::fmt;

const ERRORS_KEY: &str = "_errors";

/// One validation failure at a specific field of the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Colon-joined keys and array indices leading to the field.
    pub path: String,
    pub message: String,
    pub code: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.code, self.message)
    }
}

/// Flatten a nested error tree depth-first, in the tree's own key order.
///
/// Array elements are addressed by their stringified index. No entries are
/// merged or de-duplicated.
pub fn flatten_errors(errors: &Value) -> Vec<FieldError> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    walk(errors, &mut path, &mut out);
    out
}

fn walk(node: &Value, path: &mut Vec<String>, out: &mut Vec<FieldError>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                if key == ERRORS_KEY {
                    collect_leaf(child, &path.join(":"), out);
                    continue;
                }
                descend(key.clone(), child, path, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                descend(index.to_string(), child, path, out);
            }
        }
        _ => {}
    }
}

fn descend(segment: String, child: &Value, path: &mut Vec<String>, out: &mut Vec<FieldError>) {
    if !(child.is_object() || child.is_array()) {
        return;
    }
    path.push(segment);
    walk(child, path, out);
    path.pop();
}

fn collect_leaf(entries: &Value, path: &str, out: &mut Vec<FieldError>) {
    let Some(entries) = entries.as_array() else {
        return;
    };
    for entry in entries {
        out.push(FieldError {
            path: path.to_string(),
            message: text_of(entry.get("message")),
            code: text_of(entry.get("code")),
        });
    }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
