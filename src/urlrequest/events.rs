//! Per-request lifecycle events.
//!
//! Four typed channels: `request` (the descriptor, before anything is
//! sent), `response` (the resolved value), `error` and `done` (either
//! outcome, always last). `done` is tied to the load state: it fires on the
//! transition into [`LoadState::Settled`] and never again.

use crate::base::loadstate::{LoadState, Outcome};
use crate::base::neterror::NetError;
use crate::http::response::ResponseValue;
use crate::urlrequest::request::RequestDescriptor;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type RequestListener = Arc<dyn Fn(&RequestDescriptor) + Send + Sync>;
pub type ResponseListener = Arc<dyn Fn(&ResponseValue) + Send + Sync>;
pub type ErrorListener = Arc<dyn Fn(&NetError) + Send + Sync>;
pub type DoneListener = Arc<dyn Fn(Result<&ResponseValue, &NetError>) + Send + Sync>;

/// The four channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Request,
    Response,
    Error,
    Done,
}

/// Handle returned on registration, used to remove one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Listeners {
    request: Vec<(ListenerId, RequestListener)>,
    response: Vec<(ListenerId, ResponseListener)>,
    error: Vec<(ListenerId, ErrorListener)>,
    done: Vec<(ListenerId, DoneListener)>,
}

impl Listeners {
    fn clear(&mut self, kind: EventKind) {
        match kind {
            EventKind::Request => self.request.clear(),
            EventKind::Response => self.response.clear(),
            EventKind::Error => self.error.clear(),
            EventKind::Done => self.done.clear(),
        }
    }
}

/// Listener registry and load-state machine of one request.
///
/// Listeners are called outside the internal lock, so a listener may
/// register or remove listeners on the same channel without deadlocking;
/// such changes take effect from the next emission.
#[derive(Default)]
pub struct EventChannel {
    listeners: Mutex<Listeners>,
    state: Mutex<LoadState>,
    next_id: AtomicU64,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_request<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&RequestDescriptor) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.lock().request.push((id, Arc::new(f)));
        id
    }

    pub fn on_response<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&ResponseValue) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.lock().response.push((id, Arc::new(f)));
        id
    }

    pub fn on_error<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&NetError) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.lock().error.push((id, Arc::new(f)));
        id
    }

    pub fn on_done<F>(&self, f: F) -> ListenerId
    where
        F: Fn(Result<&ResponseValue, &NetError>) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.lock().done.push((id, Arc::new(f)));
        id
    }

    /// Remove one listener. Returns whether it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listener_count(&listeners);

        listeners.request.retain(|(i, _)| *i != id);
        listeners.response.retain(|(i, _)| *i != id);
        listeners.error.retain(|(i, _)| *i != id);
        listeners.done.retain(|(i, _)| *i != id);

        listener_count(&listeners) != before
    }

    /// Remove every listener of one channel.
    pub fn off_kind(&self, kind: EventKind) {
        self.lock().clear(kind);
    }

    /// Remove every listener.
    pub fn off_all(&self) {
        *self.lock() = Listeners::default();
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        let listeners = self.lock();
        match kind {
            EventKind::Request => listeners.request.len(),
            EventKind::Response => listeners.response.len(),
            EventKind::Error => listeners.error.len(),
            EventKind::Done => listeners.done.len(),
        }
    }

    pub fn state(&self) -> LoadState {
        *self.lock_state()
    }

    /// Emit `request` and move `Pending -> Sent`.
    pub fn emit_request(&self, descriptor: &RequestDescriptor) {
        {
            let mut state = self.lock_state();
            if *state == LoadState::Pending {
                *state = LoadState::Sent;
            }
        }

        let snapshot: Vec<_> = self.lock().request.iter().map(|(_, f)| f.clone()).collect();
        for listener in snapshot {
            listener(descriptor);
        }
    }

    /// Settle the request: `response` or `error`, then `done`.
    ///
    /// Only the first call has any effect.
    pub fn settle(&self, outcome: Result<&ResponseValue, &NetError>) {
        {
            let mut state = self.lock_state();
            if state.is_settled() {
                return;
            }
            *state = LoadState::Settled(match outcome {
                Ok(_) => Outcome::Ok,
                Err(_) => Outcome::Err,
            });
        }

        match outcome {
            Ok(value) => {
                let snapshot: Vec<_> =
                    self.lock().response.iter().map(|(_, f)| f.clone()).collect();
                for listener in snapshot {
                    listener(value);
                }
            }
            Err(err) => {
                let snapshot: Vec<_> = self.lock().error.iter().map(|(_, f)| f.clone()).collect();
                for listener in snapshot {
                    listener(err);
                }
            }
        }

        let snapshot: Vec<_> = self.lock().done.iter().map(|(_, f)| f.clone()).collect();
        for listener in snapshot {
            listener(outcome);
        }
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn listener_count(listeners: &Listeners) -> usize {
    listeners.request.len() + listeners.response.len() + listeners.error.len() + listeners.done.len()
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.lock();
        f.debug_struct("EventChannel")
            .field("state", &self.state())
            .field("request", &listeners.request.len())
            .field("response", &listeners.response.len())
            .field("error", &listeners.error.len())
            .field("done", &listeners.done.len())
            .finish()
    }
}
