//! Response bodies before and after parsing.

use crate::base::neterror::NetError;
use bytes::Bytes;

/// A response body exactly as the transport delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    /// Body decoded to text per the request's encoding.
    Text(String),
    /// Undecoded bytes.
    Bytes(Bytes),
}

impl Default for RawBody {
    fn default() -> Self {
        RawBody::Text(String::new())
    }
}

impl From<&str> for RawBody {
    fn from(s: &str) -> Self {
        RawBody::Text(s.to_owned())
    }
}

impl From<String> for RawBody {
    fn from(s: String) -> Self {
        RawBody::Text(s)
    }
}

impl From<Bytes> for RawBody {
    fn from(b: Bytes) -> Self {
        RawBody::Bytes(b)
    }
}

impl From<Vec<u8>> for RawBody {
    fn from(v: Vec<u8>) -> Self {
        RawBody::Bytes(Bytes::from(v))
    }
}

/// A response body after the JSON parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Textual body that parsed as JSON.
    Json(serde_json::Value),
    /// Textual body that is not JSON.
    Text(String),
    /// Binary body, never parsed.
    Bytes(Bytes),
}

impl ResponseBody {
    /// Parse a raw body. Text is tried as JSON and kept verbatim when that
    /// fails; bytes pass through untouched. Never fails.
    pub fn parse(raw: RawBody) -> Self {
        match raw {
            RawBody::Text(text) => match serde_json::from_str(&text) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Text(text),
            },
            RawBody::Bytes(bytes) => ResponseBody::Bytes(bytes),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ResponseBody::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Render the body as text: JSON strings unquoted, other JSON values
    /// re-serialized, bytes decoded lossily. `None` for JSON `null`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ResponseBody::Json(serde_json::Value::Null) => None,
            ResponseBody::Json(serde_json::Value::String(s)) => Some(s.clone()),
            ResponseBody::Json(value) => Some(value.to_string()),
            ResponseBody::Text(text) => Some(text.clone()),
            ResponseBody::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Deserialize a JSON body into `T`.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        match self {
            ResponseBody::Json(value) => {
                T::deserialize(value).map_err(|_| NetError::JsonParseError)
            }
            _ => Err(NetError::JsonParseError),
        }
    }
}
