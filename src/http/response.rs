//! Response envelopes and the value a request resolves to.

use crate::base::neterror::{NetError, ResponseError};
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::responsebody::{RawBody, ResponseBody};
use http::StatusCode;

/// The envelope a transport hands back: status, headers and the buffered body.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub status_text: String,
    pub headers: OrderedHeaderMap,
    pub body: RawBody,
}

impl RawResponse {
    /// Create a response with the canonical reason phrase as status text.
    pub fn new(status: StatusCode, body: impl Into<RawBody>) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers: OrderedHeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }
}

/// A response whose body went through the JSON parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub status_text: String,
    pub headers: OrderedHeaderMap,
    pub body: ResponseBody,
}

impl HttpResponse {
    /// Parse the body of a raw response. Never fails.
    pub fn parse(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            status_text: raw.status_text,
            headers: raw.headers,
            body: ResponseBody::parse(raw.body),
        }
    }

    /// Pass 2xx responses through, turn everything else into a
    /// [`NetError::Response`].
    pub fn check_status(self) -> Result<Self, NetError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ResponseError::from_response(self).into())
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &OrderedHeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }
}

/// What a request resolves to: the body alone when unwrapping (the default),
/// or the whole response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    Body(ResponseBody),
    Response(HttpResponse),
}

impl ResponseValue {
    pub(crate) fn unwrap_from(response: HttpResponse, unwrap: bool) -> Self {
        if unwrap {
            ResponseValue::Body(response.body)
        } else {
            ResponseValue::Response(response)
        }
    }

    /// The body, whichever flavor this is.
    pub fn body(&self) -> &ResponseBody {
        match self {
            ResponseValue::Body(body) => body,
            ResponseValue::Response(response) => &response.body,
        }
    }

    /// The full response, when the request was not unwrapped.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ResponseValue::Response(response) => Some(response),
            ResponseValue::Body(_) => None,
        }
    }

    pub fn into_body(self) -> ResponseBody {
        match self {
            ResponseValue::Body(body) => body,
            ResponseValue::Response(response) => response.body,
        }
    }

    /// Shortcut for `self.body().as_json()`.
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.body().as_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_status_passes_2xx() {
        for code in [200u16, 201, 204, 299] {
            let status = StatusCode::from_u16(code).unwrap();
            let response = HttpResponse::parse(RawResponse::new(status, ""));
            assert!(response.check_status().is_ok(), "{code} should pass");
        }
    }

    #[test]
    fn test_check_status_rejects_others() {
        for code in [199u16, 300, 404, 500] {
            let status = StatusCode::from_u16(code).unwrap();
            let response = HttpResponse::parse(RawResponse::new(status, ""));
            let err = response.check_status().unwrap_err();
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_unwrap_from() {
        let response = HttpResponse::parse(RawResponse::new(StatusCode::OK, r#"{"ok":true}"#));

        let body = ResponseValue::unwrap_from(response.clone(), true);
        assert_eq!(body, ResponseValue::Body(ResponseBody::Json(json!({"ok": true}))));

        let full = ResponseValue::unwrap_from(response, false);
        assert_eq!(full.response().unwrap().status(), StatusCode::OK);
        assert_eq!(full.json(), Some(&json!({"ok": true})));
    }

    #[test]
    fn test_raw_response_status_text() {
        let raw = RawResponse::new(StatusCode::NOT_FOUND, "");
        assert_eq!(raw.status_text, "Not Found");
    }
}
