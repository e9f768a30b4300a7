use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::socket::client::SocketType;
use tokio::net::TcpStream;
use url::Url;

/// Manages the connection process: DNS -> TCP -> TLS.
pub struct ConnectJob;

impl ConnectJob {
    pub async fn connect(url: &Url) -> Result<SocketType, NetError> {
        let secure = match url.scheme() {
            "http" => false,
            "https" => true,
            _ => return Err(NetError::UnknownUrlScheme),
        };

        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

        // 1. DNS
        let addrs: Vec<_> = tokio::net::lookup_host((host, port))
            .await
            .dns_context(host)?
            .collect();

        // 2. TCP, first address that answers wins
        let mut last_err = None;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }

        let stream = match (stream, last_err) {
            (Some(s), _) => s,
            (None, Some(e)) => return Err::<SocketType, _>(e).connection_context(host, port),
            (None, None) => {
                tracing::debug!(host = %host, "DNS returned no addresses");
                return Err(NetError::Network);
            }
        };
        let _ = stream.set_nodelay(true);

        tracing::debug!(host = %host, port, secure, "connected");

        // 3. TLS
        if secure {
            Self::handshake(host, stream).await
        } else {
            Ok(SocketType::Tcp(stream))
        }
    }

    #[cfg(feature = "tls")]
    async fn handshake(host: &str, stream: TcpStream) -> Result<SocketType, NetError> {
        use boring::ssl::{SslConnector, SslMethod};

        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        // http/1.1 only
        builder
            .set_alpn_protos(b"\x08http/1.1")
            .map_err(|_| NetError::SslProtocolError)?;

        let config = builder
            .build()
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;

        let tls_stream = tokio_boring::connect(config, host, stream)
            .await
            .map_err(|e| {
                tracing::debug!(host = %host, error = ?e, "TLS handshake failed");
                NetError::SslProtocolError
            })?;

        Ok(SocketType::Ssl(tls_stream))
    }

    #[cfg(not(feature = "tls"))]
    async fn handshake(host: &str, _stream: TcpStream) -> Result<SocketType, NetError> {
        tracing::debug!(host = %host, "https requested but the `tls` feature is disabled");
        Err(NetError::UnknownUrlScheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_unknown_scheme() {
        let url = Url::parse("ftp://example.com/file").unwrap();
        let err = ConnectJob::connect(&url).await.unwrap_err();
        assert_eq!(err, NetError::UnknownUrlScheme);
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let err = ConnectJob::connect(&url).await.unwrap_err();
        assert_eq!(err, NetError::Network);
    }

    #[tokio::test]
    async fn test_connects_plain_tcp() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let socket = ConnectJob::connect(&url).await.unwrap();

        assert!(!socket.is_secure());
        assert_eq!(socket.tcp().peer_addr().unwrap(), addr);
    }
}
