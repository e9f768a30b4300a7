use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::response::HttpResponse;
use crate::http::responsebody::ResponseBody;
use http::StatusCode;
use thiserror::Error;

/// Message used for every 502 response regardless of its body.
pub const NO_CONNECTION_MESSAGE: &str = "No connection with server";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetError {
    // Transport Errors
    #[error("Network Error")]
    Network,
    #[error("Connection aborted due to timeout")]
    Timeout,
    #[error("Request aborted")]
    Aborted,
    #[error("SSL protocol error")]
    SslProtocolError,

    // Request Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unknown URL scheme")]
    UnknownUrlScheme,
    #[error("Invalid header")]
    InvalidHeader,

    // Response Errors
    #[error("{0}")]
    Response(Box<ResponseError>),
    #[error("HTTP body error")]
    HttpBodyError,
    #[error("JSON parse error")]
    JsonParseError,
}

impl NetError {
    /// Returns the HTTP status for response errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            NetError::Response(err) => Some(err.status),
            _ => None,
        }
    }

    /// Returns the response error, if this is one.
    pub fn response(&self) -> Option<&ResponseError> {
        match self {
            NetError::Response(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, NetError::Timeout)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, NetError::Network)
    }
}

impl From<ResponseError> for NetError {
    fn from(err: ResponseError) -> Self {
        NetError::Response(Box::new(err))
    }
}

/// A response that came back with a non-2xx status.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct ResponseError {
    pub status: StatusCode,
    pub status_text: String,
    pub headers: OrderedHeaderMap,
    pub body: ResponseBody,
    pub message: String,
    pub code: Option<String>,
}

impl ResponseError {
    /// Builds the error for a response that failed the status check.
    pub fn from_response(response: HttpResponse) -> Self {
        let message = error_message(&response);
        let code = error_code(&response.body);

        Self {
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            body: response.body,
            message,
            code,
        }
    }
}

fn error_message(response: &HttpResponse) -> String {
    if response.status == StatusCode::BAD_GATEWAY {
        return NO_CONNECTION_MESSAGE.to_string();
    }

    if let ResponseBody::Json(serde_json::Value::Object(map)) = &response.body {
        if let Some(serde_json::Value::String(message)) = map.get("message") {
            if !message.is_empty() {
                return message.clone();
            }
        }
    }

    if is_falsy(&response.body) {
        return synthesized_message(response);
    }

    match response.body.to_text() {
        Some(text) if !text.is_empty() => text,
        _ => synthesized_message(response),
    }
}

fn synthesized_message(response: &HttpResponse) -> String {
    format!(
        "Status Code {} ({})",
        response.status.as_u16(),
        response.status_text
    )
}

/// JSON `false` and zero carry no message.
fn is_falsy(body: &ResponseBody) -> bool {
    match body {
        ResponseBody::Json(serde_json::Value::Bool(b)) => !b,
        ResponseBody::Json(serde_json::Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn error_code(body: &ResponseBody) -> Option<String> {
    let ResponseBody::Json(serde_json::Value::Object(map)) = body else {
        return None;
    };

    match map.get("code")? {
        serde_json::Value::String(code) => Some(code.clone()),
        serde_json::Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}
