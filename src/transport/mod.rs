//! The wire seam.
//!
//! A [`Transport`] takes a fully prepared [`TransportRequest`] and resolves to
//! a buffered [`RawResponse`]. It never interprets status codes: a 404 is a
//! successful send. Connectivity failures resolve to [`NetError::Network`],
//! a timeout to [`NetError::Timeout`] and cancellation to
//! [`NetError::Aborted`].

pub mod socket;

pub use socket::SocketTransport;

use crate::base::neterror::NetError;
use crate::http::multipart::Form;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::response::RawResponse;
use crate::http::responsebody::RawBody;
use base64::Engine;
use bytes::Bytes;
use http::Method;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The future returned by [`Transport::send`].
pub type Sending = Pin<Box<dyn Future<Output = Result<RawResponse, NetError>> + Send>>;

/// Sends a request over the wire.
pub trait Transport: Send + Sync {
    fn send(&self, request: TransportRequest) -> Sending;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: TransportRequest) -> Sending {
        (**self).send(request)
    }
}

/// Everything a transport needs to put one request on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Effective path: normalized path plus query string. May be absolute.
    pub path: String,
    pub method: Method,
    pub headers: OrderedHeaderMap,
    pub body: WireBody,
    pub encoding: ResponseEncoding,
    pub timeout: Option<Duration>,
    /// Resolved credentials flag; `None` when neither the request nor the
    /// client set one.
    pub with_credentials: Option<bool>,
    pub abort: Option<CancellationToken>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: OrderedHeaderMap::new(),
            body: WireBody::Empty,
            encoding: ResponseEncoding::default(),
            timeout: None,
            with_credentials: None,
            abort: None,
        }
    }
}

/// A request body after serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WireBody {
    #[default]
    Empty,
    Text(String),
    Bytes(Bytes),
    Form(Form),
}

impl WireBody {
    pub fn is_empty(&self) -> bool {
        match self {
            WireBody::Empty => true,
            WireBody::Text(s) => s.is_empty(),
            WireBody::Bytes(b) => b.is_empty(),
            WireBody::Form(form) => form.is_empty(),
        }
    }

    /// Textual view for logging.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WireBody::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Encode into bytes. Forms are encoded with their boundary.
    pub fn into_bytes(self) -> Bytes {
        match self {
            WireBody::Empty => Bytes::new(),
            WireBody::Text(s) => Bytes::from(s),
            WireBody::Bytes(b) => b,
            WireBody::Form(form) => form.into_body(),
        }
    }
}

/// How a transport turns response bytes into a body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseEncoding {
    /// UTF-8 text, invalid sequences replaced.
    #[default]
    Utf8,
    /// ISO-8859-1 text: every byte is one char.
    Latin1,
    /// Standard base64 text of the raw bytes.
    Base64,
    /// Raw bytes, no decoding.
    Binary,
}

impl ResponseEncoding {
    pub fn decode(self, bytes: Bytes) -> RawBody {
        match self {
            ResponseEncoding::Utf8 => RawBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
            ResponseEncoding::Latin1 => RawBody::Text(bytes.iter().map(|&b| b as char).collect()),
            ResponseEncoding::Base64 => {
                RawBody::Text(base64::engine::general_purpose::STANDARD.encode(&bytes))
            }
            ResponseEncoding::Binary => RawBody::Bytes(bytes),
        }
    }
}
