//! SocketTransport against a local HTTP/1.1 stub.

use bytes::Bytes;
use fetchnet::base::neterror::NetError;
use fetchnet::http::responsebody::{RawBody, ResponseBody};
use fetchnet::transport::{ResponseEncoding, Transport, TransportRequest, WireBody};
use fetchnet::{CancellationToken, Client, Form, SocketTransport};
use http::{Method, StatusCode};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Accept one connection, read the request, write `response` verbatim.
/// The handle resolves to the raw request text.
async fn serve_once(response: &'static str) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (addr, handle)
}

/// Accept one connection and never answer.
async fn serve_silent() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn client_for(addr: SocketAddr) -> Client {
    let transport = SocketTransport::with_base_url(&format!("http://{addr}")).unwrap();
    Client::builder()
        .transport(transport)
        .flush_interval(None)
        .build()
}

#[tokio::test]
async fn test_get_json() {
    let (addr, server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"id\":42}\r\n",
    )
    .await;
    let client = client_for(addr);

    let value = client
        .get("/api/users")
        .query_param("page", 1)
        .header("X-Token", "abc")
        .await
        .unwrap();

    assert_eq!(value.json(), Some(&json!({"id": 42})));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/users?page=1 HTTP/1.1\r\n"));
    let lower = request.to_lowercase();
    assert!(lower.contains(&format!("host: {addr}")));
    assert!(lower.contains("x-token: abc"));
}

#[tokio::test]
async fn test_post_json_body() {
    let (addr, server) =
        serve_once("HTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n").await;
    let client = client_for(addr);

    let value = client
        .post("/api/users")
        .json(&json!({"name": "ann"}))
        .unwrap_body(false)
        .await
        .unwrap();

    assert_eq!(value.response().unwrap().status(), StatusCode::CREATED);

    let request = server.await.unwrap();
    let lower = request.to_lowercase();
    assert!(request.starts_with("POST /api/users HTTP/1.1\r\n"));
    assert!(lower.contains("content-type: application/json"));
    assert!(lower.contains("content-length: 14"));
    assert!(request.ends_with("\r\n\r\n{\"name\":\"ann\"}"));
}

#[tokio::test]
async fn test_response_details() {
    let (addr, _server) = serve_once(
        "HTTP/1.1 200 Fine\r\nX-One: a\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\nContent-Length: 2\r\n\r\nhi",
    )
    .await;
    let transport = SocketTransport::new();

    let raw = transport
        .send(TransportRequest::new(Method::GET, format!("http://{addr}/")))
        .await
        .unwrap();

    assert_eq!(raw.status, StatusCode::OK);
    assert_eq!(raw.status_text, "Fine");
    assert_eq!(raw.headers.get_ignore_case("x-one"), Some("a"));
    assert_eq!(raw.headers.get_ignore_case("set-cookie"), Some("a=1, b=2"));
    assert_eq!(raw.body, RawBody::Text("hi".into()));
}

#[tokio::test]
async fn test_error_status_is_a_successful_send() {
    let (addr, _server) = serve_once(
        "HTTP/1.1 404 Not Found\r\nContent-Length: 20\r\n\r\n{\"message\":\"nope\"}\r\n",
    )
    .await;
    let transport = SocketTransport::new();

    let raw = transport
        .send(TransportRequest::new(Method::GET, format!("http://{addr}/missing")))
        .await
        .unwrap();

    assert_eq!(raw.status, StatusCode::NOT_FOUND);
    assert_eq!(raw.status_text, "Not Found");
}

#[tokio::test]
async fn test_error_status_through_client() {
    let (addr, _server) = serve_once(
        "HTTP/1.1 404 Not Found\r\nContent-Length: 18\r\n\r\n{\"message\":\"nope\"}",
    )
    .await;
    let client = client_for(addr);

    let err = client.get("/missing").await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.to_string(), "nope");
}

#[tokio::test]
async fn test_binary_encoding() {
    let (addr, _server) =
        serve_once("HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\n\x00\x01\x02").await;
    let client = client_for(addr);

    let value = client
        .get("/blob")
        .encoding(ResponseEncoding::Binary)
        .await
        .unwrap();

    assert_eq!(
        value.body(),
        &ResponseBody::Bytes(Bytes::from_static(b"\x00\x01\x02"))
    );
}

#[tokio::test]
async fn test_form_body() {
    let (addr, server) = serve_once("HTTP/1.1 204 No Content\r\n\r\n").await;
    let transport = SocketTransport::new();

    let form = Form::with_boundary("xyz").text("name", "ann");
    let expected_len = form.content_length();
    let mut request = TransportRequest::new(Method::POST, format!("http://{addr}/upload"));
    request.body = WireBody::Form(form);

    let raw = transport.send(request).await.unwrap();
    assert_eq!(raw.status, StatusCode::NO_CONTENT);

    let request = server.await.unwrap();
    let lower = request.to_lowercase();
    assert!(lower.contains("content-type: multipart/form-data; boundary=xyz"));
    assert!(lower.contains(&format!("content-length: {expected_len}")));
    assert!(request.contains("Content-Disposition: form-data; name=\"name\"\r\n\r\nann\r\n--xyz--\r\n"));
}

#[tokio::test]
async fn test_timeout() {
    let addr = serve_silent().await;
    let client = client_for(addr);

    let err = client
        .get("/slow")
        .timeout(Duration::from_millis(50))
        .await
        .unwrap_err();

    assert_eq!(err, NetError::Timeout);
}

#[tokio::test]
async fn test_abort() {
    let addr = serve_silent().await;
    let client = client_for(addr);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = client.get("/slow").abort_signal(token).await.unwrap_err();

    assert_eq!(err, NetError::Aborted);
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr).get("/").await.unwrap_err();

    assert!(err.is_network());
}

#[tokio::test]
async fn test_relative_path_without_base_url() {
    let client = Client::builder().flush_interval(None).build();

    let err = client.get("/api/users").await.unwrap_err();

    assert_eq!(err, NetError::InvalidUrl);
}

#[tokio::test]
async fn test_unknown_scheme() {
    let transport = SocketTransport::new();

    let err = transport
        .send(TransportRequest::new(Method::GET, "ftp://example.com/file"))
        .await
        .unwrap_err();

    assert_eq!(err, NetError::UnknownUrlScheme);
}
