//! # fetchnet
//!
//! A fluent HTTP request client with a tagged response cache.
//!
//! Requests are configured with chained builder calls and run lazily, at
//! most once, when first awaited. Responses can be cached per path for a
//! TTL and invalidated in bulk by tags: a successful non-GET request drops
//! every cached entry whose tags match its own.
//!
//! ## Features
//!
//! - **Tagged cache**: TTL expiry on read and by a background sweep,
//!   invalidation by literal or regex tags
//! - **Memoized execution**: any number of awaiters share one transport call
//! - **Lifecycle events**: `request`, `response`, `error`, `done`
//! - **Pluggable transports**: anything implementing [`Transport`];
//!   [`SocketTransport`] speaks HTTP/1.1 (HTTPS with the `tls` feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fetchnet::{Client, SocketTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fetchnet::NetError> {
//!     let client = Client::builder()
//!         .transport(SocketTransport::with_base_url("http://localhost:8080")?)
//!         .build();
//!
//!     let users = client
//!         .get("/api/users")
//!         .cache_tags(["users"])
//!         .use_cache()
//!         .await?;
//!
//!     // Drops the cached list above.
//!     client
//!         .post("/api/users")
//!         .cache_tags(["users"])
//!         .json(&serde_json::json!({ "name": "ann" }))
//!         .await?;
//!
//!     println!("{:?}", users.json());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Errors and load states
//! - [`http`] - Cache, bodies, headers, path and query encoding
//! - [`socket`] - DNS, TCP and TLS connection setup
//! - [`transport`] - The transport trait and the socket transport
//! - [`urlrequest`] - Request builder, pipeline and events

pub mod base;
pub mod client;
pub mod http;
pub mod socket;
pub mod transport;
pub mod urlrequest;

pub use base::neterror::{NetError, ResponseError};
pub use client::{Client, ClientBuilder, ResponseCache};
pub use crate::http::{CacheTag, Form, Part, PartOptions, ResponseBody, ResponseValue, TaggedCache};
pub use transport::{ResponseEncoding, SocketTransport, Transport, TransportRequest};
pub use urlrequest::{Execution, Request};

pub use tokio_util::sync::CancellationToken;
