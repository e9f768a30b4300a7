//! Query-string serialization.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Insertion-ordered query parameters. A `null` value means "unset" and is
/// left out of the query string.
pub type QueryParams = Map<String, Value>;

/// Serialize `params` into `key=value` pairs joined by `&`.
///
/// Arrays expand into one pair per element, `null` values (and `null`
/// array elements) are omitted, strings are used verbatim and every other
/// value is rendered as JSON text. Keys and values are percent-encoded.
pub fn stringify(params: &QueryParams) -> String {
    let mut tokens = Vec::new();

    for (key, value) in params {
        let values: &[Value] = match value {
            Value::Null => continue,
            Value::Array(items) => items,
            other => std::slice::from_ref(other),
        };

        for value in values {
            if let Some(text) = scalar_text(value) {
                tokens.push(format!("{}={}", encode_component(key), encode_component(&text)));
            }
        }
    }

    tokens.join("&")
}

/// Percent-encode one query component.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
