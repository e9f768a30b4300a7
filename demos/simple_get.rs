//! Simple HTTP GET request example.
//!
//! Sends one request through the socket transport and prints the response.
//! Run with `RUST_LOG=fetchnet=debug` to see the connection steps.

use fetchnet::{Client, SocketTransport};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::builder()
        .transport(SocketTransport::with_base_url("http://httpbin.org")?)
        .verbose(true)
        .build();

    println!("Sending request to httpbin.org...");
    let value = client
        .get("/get")
        .query_param("source", "fetchnet")
        .header("Accept", "application/json")
        .unwrap_body(false)
        .await?;

    if let Some(response) = value.response() {
        println!("Status: {} {}", response.status(), response.status_text);
        println!("Headers:");
        for (name, value) in response.headers().iter() {
            println!("  {}: {}", name, value);
        }
    }

    match value.json() {
        Some(json) => println!("{}", serde_json::to_string_pretty(json)?),
        None => println!("{:?}", value.body()),
    }

    Ok(())
}
