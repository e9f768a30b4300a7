//! Tests for Client API.

mod common;

use common::MockTransport;
use fetchnet::client::{Client, ResponseCache};
use fetchnet::transport::WireBody;
use fetchnet::Form;
use http::Method;
use std::sync::Arc;
use std::time::Duration;

// === Client Tests ===

#[test]
fn test_client_creation() {
    let _client = Client::new();
}

#[test]
fn test_client_builder() {
    let _client = Client::builder().build();
}

#[tokio::test]
async fn test_client_request_methods() {
    let mock = MockTransport::new();
    let client = common::client(&mock);

    client.get("/r").await.unwrap();
    client.post("/r").await.unwrap();
    client.put("/r").await.unwrap();
    client.patch("/r").await.unwrap();
    client.delete("/r").await.unwrap();
    client.request(Method::OPTIONS, "/r").await.unwrap();

    let methods: Vec<_> = mock.requests().into_iter().map(|r| r.method).collect();
    assert_eq!(
        methods,
        [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS
        ]
    );
}

#[test]
fn test_request_builder_defaults() {
    let client = Client::new();
    let req = client.get("/users/ä b");

    let d = req.descriptor();
    assert_eq!(d.method, Method::GET);
    assert_eq!(d.path, "/users/%C3%A4%20b");
    assert!(d.unwrap);
    assert!(d.tags.is_none());
    assert!(d.cache_ttl.is_zero());
}

#[test]
fn test_request_builder_headers() {
    let client = Client::new();

    let req = client
        .get("https://example.com")
        .header("X-Custom", "value")
        .header(http::header::ACCEPT.as_str(), "application/json");

    assert_eq!(req.descriptor().headers.get("X-Custom"), Some("value"));
    assert_eq!(req.descriptor().headers.get("accept"), Some("application/json"));
}

#[tokio::test]
async fn test_form_factory_is_used() {
    let mock = MockTransport::new();
    let client = Client::builder()
        .transport(mock.clone())
        .flush_interval(None)
        .form_factory(|| Form::with_boundary("fixed"))
        .build();

    client.post("/f").form_fields([("a", "1")]).await.unwrap();

    match mock.last_request().body {
        WireBody::Form(form) => assert_eq!(form.boundary(), "fixed"),
        other => panic!("unexpected body {other:?}"),
    }
}

#[test]
fn test_flush_interval_applies_to_shared_cache() {
    let cache = Arc::new(ResponseCache::new(Some(Duration::from_secs(5))));
    let _client = Client::builder()
        .cache(cache.clone())
        .flush_interval(Some(Duration::from_secs(1)))
        .build();

    assert_eq!(cache.flush_interval(), Some(Duration::from_secs(1)));
}

#[tokio::test]
async fn test_client_clone_shares_transport() {
    let mock = MockTransport::new();
    let client = common::client(&mock);
    let cloned = client.clone();

    client.get("/a").await.unwrap();
    cloned.get("/b").await.unwrap();

    assert_eq!(mock.calls(), 2);
}
