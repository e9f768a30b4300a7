//! Cached reads and tag invalidation against an in-process transport.
//!
//! The transport below fakes a tiny user API so the example runs offline.

use fetchnet::http::response::RawResponse;
use fetchnet::transport::{Sending, Transport, TransportRequest};
use fetchnet::{CacheTag, Client};
use http::{Method, StatusCode};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct FakeApi {
    version: AtomicUsize,
    hits: AtomicUsize,
}

impl Transport for FakeApi {
    fn send(&self, request: TransportRequest) -> Sending {
        self.hits.fetch_add(1, Ordering::SeqCst);
        if request.method != Method::GET {
            self.version.fetch_add(1, Ordering::SeqCst);
        }
        let body = json!({
            "path": request.path,
            "version": self.version.load(Ordering::SeqCst),
        });
        Box::pin(async move { Ok(RawResponse::new(StatusCode::OK, body.to_string())) })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("fetchnet=debug"))
        .init();

    let api = Arc::new(FakeApi::default());
    let client = Client::builder().transport(api.clone()).build();

    for _ in 0..3 {
        let users = client
            .get("/users")
            .cache_tags(["users", "user:1"])
            .use_cache()
            .await?;
        println!("read  {:?}", users.json());
    }
    println!("transport hits after cached reads: {}", api.hits.load(Ordering::SeqCst));

    client
        .patch("/users/1")
        .json(&json!({ "name": "ann" }))
        .cache_tags([CacheTag::pattern("^user:")?])
        .await?;

    let users = client.get("/users").cache_tags(["users"]).use_cache().await?;
    println!("fresh {:?}", users.json());
    println!("transport hits: {}", api.hits.load(Ordering::SeqCst));

    client.cache().dispose();
    Ok(())
}
