//! The request builder and its pipeline.
//!
//! - [`request`]: the fluent [`Request`] builder and its descriptor
//! - `job`: one run of the pipeline
//! - [`execution`]: the shared, memoized outcome
//! - [`events`]: per-request lifecycle listeners

pub mod events;
pub mod execution;
pub(crate) mod job;
pub mod request;

pub use events::{EventChannel, EventKind, ListenerId};
pub use execution::Execution;
pub use request::{Request, RequestDescriptor};
