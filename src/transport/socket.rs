//! HTTP/1.1 transport over plain sockets.

use crate::base::neterror::NetError;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::response::RawResponse;
use crate::http::streamfactory::HttpStreamFactory;
use crate::transport::{Sending, Transport, TransportRequest, WireBody};
use http::header::{CONTENT_LENGTH, HOST};
use http::{HeaderValue, Request};
use http_body_util::{BodyExt, Full};
use url::{Position, Url};

/// Sends each request on a fresh connection: DNS, TCP, optional TLS, then
/// one HTTP/1.1 exchange whose response body is buffered in full.
///
/// Relative paths are resolved against the base URL; without one they fail
/// with [`NetError::InvalidUrl`]. The credentials flag has no meaning outside
/// a browser and is ignored.
#[derive(Debug, Clone, Default)]
pub struct SocketTransport {
    base_url: Option<Url>,
}

impl SocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base`.
    pub fn with_base_url(base: &str) -> Result<Self, NetError> {
        let base = Url::parse(base).map_err(|_| NetError::InvalidUrl)?;
        if !base.has_host() {
            return Err(NetError::InvalidUrl);
        }
        Ok(Self {
            base_url: Some(base),
        })
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Turn an effective path into an absolute URL.
    pub fn resolve(&self, path: &str) -> Result<Url, NetError> {
        match Url::parse(path) {
            Ok(url) if url.has_host() => Ok(url),
            _ => match &self.base_url {
                Some(base) => base.join(path).map_err(|_| NetError::InvalidUrl),
                None => Err(NetError::InvalidUrl),
            },
        }
    }
}

impl Transport for SocketTransport {
    fn send(&self, request: TransportRequest) -> Sending {
        let resolved = self.resolve(&request.path);

        Box::pin(async move {
            let url = resolved?;
            let timeout = request.timeout;
            let abort = request.abort.clone();

            let exchange = async move {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, perform(url, request))
                        .await
                        .map_err(|_| NetError::Timeout)?,
                    None => perform(url, request).await,
                }
            };

            match abort {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => Err(NetError::Aborted),
                        result = exchange => result,
                    }
                }
                None => exchange.await,
            }
        })
    }
}

async fn perform(url: Url, request: TransportRequest) -> Result<RawResponse, NetError> {
    let TransportRequest {
        method,
        mut headers,
        body,
        encoding,
        ..
    } = request;

    if let WireBody::Form(form) = &body {
        for (name, value) in form.headers().iter() {
            if !headers.contains_ignore_case(name) {
                headers.insert(name, value);
            }
        }
    }

    let mut header_map = headers.to_header_map()?;

    if !header_map.contains_key(HOST) {
        header_map.insert(HOST, host_header(&url)?);
    }

    let payload = body.into_bytes();
    if !payload.is_empty() && !header_map.contains_key(CONTENT_LENGTH) {
        header_map.insert(CONTENT_LENGTH, HeaderValue::from(payload.len()));
    }

    let target = &url[Position::BeforePath..Position::AfterQuery];
    let mut req = Request::builder()
        .method(method.clone())
        .uri(target)
        .body(Full::new(payload))
        .map_err(|_| NetError::InvalidUrl)?;
    *req.headers_mut() = header_map;

    tracing::debug!(method = %method, url = %url, "sending request");

    let mut stream = HttpStreamFactory::request_stream(&url).await?;
    let response = stream.send_request(req).await?;

    let status = response.status();
    let status_text = response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
    let headers = OrderedHeaderMap::from_header_map(response.headers());

    let bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "failed to read response body");
            NetError::HttpBodyError
        })?
        .to_bytes();

    tracing::debug!(status = status.as_u16(), len = bytes.len(), "response received");

    Ok(RawResponse {
        status,
        status_text,
        headers,
        body: encoding.decode(bytes),
    })
}

fn host_header(url: &Url) -> Result<HeaderValue, NetError> {
    let host = url.host_str().ok_or(NetError::InvalidUrl)?;
    let value = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    HeaderValue::from_str(&value).map_err(|_| NetError::InvalidHeader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute() {
        let transport = SocketTransport::new();
        let url = transport.resolve("http://example.com:8080/api?x=1").unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/api?x=1");
    }

    #[test]
    fn test_resolve_relative_without_base() {
        let transport = SocketTransport::new();
        assert_eq!(transport.resolve("/api/users"), Err(NetError::InvalidUrl));
    }

    #[test]
    fn test_resolve_relative_with_base() {
        let transport = SocketTransport::with_base_url("http://localhost:9000").unwrap();
        let url = transport.resolve("/api/users?page=2").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/users?page=2");
    }

    #[test]
    fn test_base_url_needs_host() {
        assert!(SocketTransport::with_base_url("mailto:a@b.c").is_err());
        assert!(SocketTransport::with_base_url("not a url").is_err());
    }

    #[test]
    fn test_host_header() {
        let url = Url::parse("http://example.com:8080/").unwrap();
        assert_eq!(host_header(&url).unwrap(), "example.com:8080");

        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(host_header(&url).unwrap(), "example.com");
    }
}
