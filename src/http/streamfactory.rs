use crate::base::neterror::NetError;
use crate::socket::connectjob::ConnectJob;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::spawn;
use url::Url;

/// An HTTP/1.1 stream over one fresh connection.
pub struct HttpStream {
    sender: http1::SendRequest<Full<Bytes>>,
}

impl HttpStream {
    pub async fn send_request(
        &mut self,
        req: Request<Full<Bytes>>,
    ) -> Result<Response<Incoming>, NetError> {
        self.sender.send_request(req).await.map_err(|e| {
            tracing::debug!(error = %e, "request failed");
            NetError::Network
        })
    }
}

/// Opens one connection per request; there is no pooling.
pub struct HttpStreamFactory;

impl HttpStreamFactory {
    pub async fn request_stream(url: &Url) -> Result<HttpStream, NetError> {
        let socket = ConnectJob::connect(url).await?;
        tracing::debug!(
            peer = ?socket.tcp().peer_addr().ok(),
            secure = socket.is_secure(),
            "connected"
        );
        let io = TokioIo::new(socket);

        let (sender, conn) = http1::handshake(io).await.map_err(|e| {
            tracing::debug!(error = %e, "HTTP/1.1 handshake failed");
            NetError::Network
        })?;

        // The driver ends when the sender is dropped or the peer closes.
        spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        });

        Ok(HttpStream { sender })
    }
}
