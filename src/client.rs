//! HTTP client with builder pattern.
//!
//! The client is the wiring point: it owns the transport, the response
//! cache shared by all of its requests and a few process-level settings.
//!
//! # Example
//!
//! ```rust,ignore
//! use fetchnet::{Client, SocketTransport};
//! use std::time::Duration;
//!
//! let client = Client::builder()
//!     .transport(SocketTransport::with_base_url("https://api.example.com")?)
//!     .flush_interval(Some(Duration::from_secs(30)))
//!     .build();
//!
//! let user = client.get("/users/42").use_cache().await?;
//! ```

use crate::http::httpcache::{TaggedCache, DEFAULT_FLUSH_INTERVAL};
use crate::http::multipart::Form;
use crate::http::response::ResponseValue;
use crate::transport::{SocketTransport, Transport};
use crate::urlrequest::request::Request;
use http::Method;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Builds the empty form that [`Request::form_fields`] fills in.
pub type FormFactory = Arc<dyn Fn() -> Form + Send + Sync>;

/// The response cache type used by clients.
pub type ResponseCache = TaggedCache<ResponseValue>;

/// HTTP client for making requests.
///
/// Cheap to clone; clones share the transport and the cache.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    verbose: bool,
    with_credentials: Option<bool>,
    form_factory: FormFactory,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// A client over [`SocketTransport`] with a fresh cache.
    pub fn new() -> Self {
        ClientBuilder::default().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn get(&self, path: impl AsRef<str>) -> Request {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: impl AsRef<str>) -> Request {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: impl AsRef<str>) -> Request {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: impl AsRef<str>) -> Request {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: impl AsRef<str>) -> Request {
        self.request(Method::DELETE, path)
    }

    /// Start a request with any method.
    pub fn request(&self, method: Method, path: impl AsRef<str>) -> Request {
        Request::new(self.clone(), method, path.as_ref())
    }

    /// The cache shared by this client's requests.
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Credentials flag used by requests that do not set their own.
    pub fn default_credentials(&self) -> Option<bool> {
        self.with_credentials
    }

    /// A new empty form from the configured factory.
    pub fn new_form(&self) -> Form {
        (self.form_factory)()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("cache", &self.cache)
            .field("verbose", &self.verbose)
            .field("with_credentials", &self.with_credentials)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<ResponseCache>>,
    flush_interval: Option<Option<Duration>>,
    verbose: bool,
    with_credentials: Option<bool>,
    form_factory: Option<FormFactory>,
}

impl ClientBuilder {
    /// Set the transport. Defaults to [`SocketTransport::new`].
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport) as Arc<dyn Transport>);
        self
    }

    /// Share an existing cache, e.g. between several clients.
    pub fn cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sweep interval of the cache; `None` disables periodic sweeps.
    /// Applied to a shared cache as well. Defaults to one minute for a
    /// fresh cache.
    pub fn flush_interval(mut self, interval: Option<Duration>) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /// Log every outgoing request at `info` level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Default credentials flag passed to the transport.
    pub fn with_credentials(mut self, value: bool) -> Self {
        self.with_credentials = Some(value);
        self
    }

    /// Replace how empty forms are created.
    pub fn form_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Form + Send + Sync + 'static,
    {
        self.form_factory = Some(Arc::new(factory) as FormFactory);
        self
    }

    pub fn build(self) -> Client {
        let cache = match self.cache {
            Some(cache) => {
                if let Some(interval) = self.flush_interval {
                    cache.set_flush_interval(interval);
                }
                cache
            }
            None => Arc::new(TaggedCache::new(
                self.flush_interval.unwrap_or(Some(DEFAULT_FLUSH_INTERVAL)),
            )),
        };

        Client {
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(SocketTransport::new()) as Arc<dyn Transport>),
            cache,
            verbose: self.verbose,
            with_credentials: self.with_credentials,
            form_factory: self.form_factory.unwrap_or_else(|| Arc::new(Form::new) as FormFactory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let client = Client::new();
        assert!(!client.is_verbose());
        assert_eq!(client.default_credentials(), None);
        assert_eq!(client.cache().flush_interval(), Some(DEFAULT_FLUSH_INTERVAL));
    }

    #[test]
    fn test_builder_settings() {
        let client = Client::builder()
            .verbose(true)
            .with_credentials(true)
            .flush_interval(None)
            .form_factory(|| Form::with_boundary("fixed"))
            .build();

        assert!(client.is_verbose());
        assert_eq!(client.default_credentials(), Some(true));
        assert_eq!(client.cache().flush_interval(), None);
        assert_eq!(client.new_form().boundary(), "fixed");
    }

    #[test]
    fn test_shared_cache() {
        let cache = Arc::new(ResponseCache::new(None));
        let a = Client::builder().cache(cache.clone()).build();
        let b = Client::builder().cache(cache.clone()).build();

        assert!(Arc::ptr_eq(a.cache(), b.cache()));
    }

    #[test]
    fn test_clones_share_cache() {
        let client = Client::new();
        let clone = client.clone();
        assert!(Arc::ptr_eq(client.cache(), clone.cache()));
    }
}
