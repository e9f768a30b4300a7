//! Multipart form data.
//!
//! Encodes `multipart/form-data` bodies (RFC 7578). A [`Form`] is built
//! either directly, or from loose field values through
//! [`Request::form_fields`](crate::urlrequest::Request::form_fields), which
//! casts each value to a sequence of [`FormField`]s and appends them one by
//! one.
//!
//! ```ignore
//! use fetchnet::http::multipart::{Form, Part, PartOptions};
//!
//! let form = Form::new()
//!     .text("username", "user123")
//!     .append("avatar", b"\x89PNG".to_vec(), Some(PartOptions::file("me.png")));
//! ```

use crate::http::orderedheaders::OrderedHeaderMap;
use bytes::Bytes;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

static BOUNDARY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    boundary: String,
    fields: Vec<(String, Part)>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Create a new empty form with a generated boundary.
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            fields: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Add a text field.
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.part(name, Part::text(value))
    }

    /// Add a custom part.
    pub fn part(mut self, name: impl Into<String>, part: Part) -> Self {
        self.fields.push((name.into(), part));
        self
    }

    /// Append a value, applying `options` when given.
    pub fn append(
        self,
        name: impl Into<String>,
        value: impl Into<FormValue>,
        options: Option<PartOptions>,
    ) -> Self {
        let mut part = value.into().into_part();
        if let Some(options) = options {
            part = part.with_options(options);
        }
        self.part(name, part)
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Get the Content-Type header value.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// The headers a transport sends along with this form.
    pub fn headers(&self) -> OrderedHeaderMap {
        let mut headers = OrderedHeaderMap::new();
        headers.insert("content-type", self.content_type());
        headers
    }

    /// Total encoded length.
    pub fn content_length(&self) -> usize {
        if self.fields.is_empty() {
            return 0;
        }

        let mut length = 0usize;

        for (name, part) in &self.fields {
            // --boundary\r\n
            length += 2 + self.boundary.len() + 2;
            length += part.format_headers(name).len();
            // \r\n\r\n
            length += 4;
            length += part.data.len();
            // \r\n
            length += 2;
        }

        // --boundary--\r\n
        length += 2 + self.boundary.len() + 4;

        length
    }

    /// Encode the form into body bytes.
    pub fn into_body(self) -> Bytes {
        if self.fields.is_empty() {
            return Bytes::new();
        }

        let mut output = Vec::with_capacity(self.content_length());

        for (name, part) in &self.fields {
            output.extend_from_slice(b"--");
            output.extend_from_slice(self.boundary.as_bytes());
            output.extend_from_slice(b"\r\n");

            output.extend_from_slice(part.format_headers(name).as_bytes());
            output.extend_from_slice(b"\r\n\r\n");

            output.extend_from_slice(&part.data);
            output.extend_from_slice(b"\r\n");
        }

        output.extend_from_slice(b"--");
        output.extend_from_slice(self.boundary.as_bytes());
        output.extend_from_slice(b"--\r\n");

        Bytes::from(output)
    }
}

/// A part of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    data: Bytes,
    content_type: Option<String>,
    file_name: Option<String>,
}

impl Part {
    /// Create a text part. No content type is declared, which readers
    /// treat as `text/plain`.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            data: Bytes::from(value.into()),
            content_type: None,
            file_name: None,
        }
    }

    /// Create a part from bytes.
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            content_type: Some("application/octet-stream".to_string()),
            file_name: None,
        }
    }

    pub fn content_type(mut self, mime: impl Into<String>) -> Self {
        self.content_type = Some(mime.into());
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Apply per-part options; unset options leave the part as is.
    pub fn with_options(mut self, options: PartOptions) -> Self {
        if let Some(name) = options.file_name {
            self.file_name = Some(name);
        }
        if let Some(mime) = options.content_type {
            self.content_type = Some(mime);
        }
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn format_headers(&self, name: &str) -> String {
        let mut header = format!(
            "Content-Disposition: form-data; name=\"{}\"",
            escape_quotes(name)
        );

        if let Some(ref filename) = self.file_name {
            header.push_str(&format!("; filename=\"{}\"", escape_quotes(filename)));
        }

        if let Some(ref mime) = self.content_type {
            header.push_str(&format!("\r\nContent-Type: {}", mime));
        }

        header
    }
}

/// Per-part options: file name and content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartOptions {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl PartOptions {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            file_name: Some(name.into()),
            content_type: None,
        }
    }

    pub fn content_type(mut self, mime: impl Into<String>) -> Self {
        self.content_type = Some(mime.into());
        self
    }
}

/// A single value appended to a form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    Bytes(Bytes),
}

impl FormValue {
    fn into_part(self) -> Part {
        match self {
            FormValue::Text(text) => Part::text(text),
            FormValue::Bytes(bytes) => Part::bytes(bytes),
        }
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::Text(s.to_owned())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        FormValue::Text(s)
    }
}

impl From<Bytes> for FormValue {
    fn from(b: Bytes) -> Self {
        FormValue::Bytes(b)
    }
}

impl From<Vec<u8>> for FormValue {
    fn from(v: Vec<u8>) -> Self {
        FormValue::Bytes(Bytes::from(v))
    }
}

/// A form value, optionally carrying its own part options.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub value: FormValue,
    pub options: Option<PartOptions>,
}

impl FormField {
    pub fn new(value: impl Into<FormValue>) -> Self {
        Self {
            value: value.into(),
            options: None,
        }
    }

    pub fn with_options(value: impl Into<FormValue>, options: PartOptions) -> Self {
        Self {
            value: value.into(),
            options: Some(options),
        }
    }
}

impl From<FormValue> for FormField {
    fn from(value: FormValue) -> Self {
        FormField::new(value)
    }
}

impl From<&str> for FormField {
    fn from(s: &str) -> Self {
        FormField::new(s)
    }
}

impl From<String> for FormField {
    fn from(s: String) -> Self {
        FormField::new(s)
    }
}

impl From<Bytes> for FormField {
    fn from(b: Bytes) -> Self {
        FormField::new(b)
    }
}

/// One or many values for the same field name. Single values are cast to a
/// one-element sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFieldValues(pub Vec<FormField>);

impl From<FormField> for FormFieldValues {
    fn from(field: FormField) -> Self {
        FormFieldValues(vec![field])
    }
}

impl From<&str> for FormFieldValues {
    fn from(s: &str) -> Self {
        FormFieldValues(vec![s.into()])
    }
}

impl From<String> for FormFieldValues {
    fn from(s: String) -> Self {
        FormFieldValues(vec![s.into()])
    }
}

impl From<Bytes> for FormFieldValues {
    fn from(b: Bytes) -> Self {
        FormFieldValues(vec![b.into()])
    }
}

impl From<Vec<FormField>> for FormFieldValues {
    fn from(fields: Vec<FormField>) -> Self {
        FormFieldValues(fields)
    }
}

impl<T: Into<FormField>> FromIterator<T> for FormFieldValues {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        FormFieldValues(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for FormFieldValues {
    type Item = FormField;
    type IntoIter = std::vec::IntoIter<FormField>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Escape quotes, backslashes and line breaks in a header parameter.
fn escape_quotes(s: &str) -> Cow<'_, str> {
    if s.contains(['"', '\\', '\r', '\n']) {
        Cow::Owned(
            s.replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\r', "\\r")
                .replace('\n', "\\n"),
        )
    } else {
        Cow::Borrowed(s)
    }
}

fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = BOUNDARY_COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("----fetchnet-{:016x}{:08x}{:04x}", nanos, std::process::id(), seq)
}
