//! Request bodies.

use crate::base::neterror::NetError;
use crate::http::multipart::Form;
use bytes::Bytes;
use serde_json::Value;

/// Body a request is configured with.
///
/// `Json` is serialized to text by the pipeline before it reaches a
/// transport; every other variant is sent as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Text(String),
    Bytes(Bytes),
    Form(Form),
}

impl RequestBody {
    /// Serialize `value` into a `Json` body.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self, NetError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|_| NetError::JsonParseError)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    pub fn is_form(&self) -> bool {
        matches!(self, RequestBody::Form(_))
    }

    /// Length in bytes once on the wire, if known without encoding.
    pub fn len(&self) -> Option<usize> {
        match self {
            RequestBody::Empty => Some(0),
            RequestBody::Json(_) => None,
            RequestBody::Text(s) => Some(s.len()),
            RequestBody::Bytes(b) => Some(b.len()),
            RequestBody::Form(form) => Some(form.content_length()),
        }
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Text(s)
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Text(s.to_owned())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl From<Value> for RequestBody {
    fn from(v: Value) -> Self {
        RequestBody::Json(v)
    }
}

impl From<Form> for RequestBody {
    fn from(form: Form) -> Self {
        RequestBody::Form(form)
    }
}
