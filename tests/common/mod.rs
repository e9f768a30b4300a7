//! Shared test helpers: a scripted in-memory transport.

#![allow(dead_code)]

use fetchnet::base::neterror::NetError;
use fetchnet::http::response::RawResponse;
use fetchnet::transport::{Sending, Transport, TransportRequest};
use fetchnet::Client;
use http::StatusCode;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays queued responses in order and records every request it sees.
/// With an empty queue it answers `200` with an empty body.
#[derive(Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<Result<RawResponse, NetError>>>,
    requests: Mutex<Vec<TransportRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every send waits `delay` before answering.
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn respond(&self, response: RawResponse) -> &Self {
        self.queue.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn respond_with(&self, status: u16, body: &str) -> &Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.respond(RawResponse::new(status, body))
    }

    pub fn fail(&self, err: NetError) -> &Self {
        self.queue.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> TransportRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for MockTransport {
    fn send(&self, request: TransportRequest) -> Sending {
        self.requests.lock().unwrap().push(request);
        let result = self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(StatusCode::OK, "")));
        let delay = self.delay;

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

/// A client over `transport` with periodic sweeps disabled.
pub fn client(transport: &Arc<MockTransport>) -> Client {
    Client::builder()
        .transport(transport.clone())
        .flush_interval(None)
        .build()
}
