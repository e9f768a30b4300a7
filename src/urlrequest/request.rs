use crate::base::loadstate::LoadState;
use crate::base::neterror::NetError;
use crate::client::Client;
use crate::http::cachetag::CacheTag;
use crate::http::multipart::{Form, FormFieldValues};
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::pathencoding::ensure_encoding;
use crate::http::querystring::{stringify, QueryParams};
use crate::http::requestbody::RequestBody;
use crate::http::response::ResponseValue;
use crate::transport::ResponseEncoding;
use crate::urlrequest::events::{EventChannel, ListenerId};
use crate::urlrequest::execution::Execution;
use crate::urlrequest::job::URLRequestJob;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::future::IntoFuture;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// TTL applied by [`Request::use_cache`].
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15);

/// Everything a request was configured with.
///
/// Only the builder methods of [`Request`] touch it; the pipeline works on a
/// snapshot taken on first execution.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Normalized path, possibly an absolute URL.
    pub path: String,
    pub headers: OrderedHeaderMap,
    pub query: QueryParams,
    pub body: RequestBody,
    /// `None` until tags are declared.
    pub tags: Option<Vec<CacheTag>>,
    /// Zero disables caching.
    pub cache_ttl: Duration,
    pub unwrap: bool,
    pub encoding: ResponseEncoding,
    pub timeout: Option<Duration>,
    /// `None` defers to the client default.
    pub with_credentials: Option<bool>,
    pub abort: Option<CancellationToken>,
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: String::new(),
            headers: OrderedHeaderMap::new(),
            query: QueryParams::new(),
            body: RequestBody::Empty,
            tags: None,
            cache_ttl: Duration::ZERO,
            unwrap: true,
            encoding: ResponseEncoding::default(),
            timeout: None,
            with_credentials: None,
            abort: None,
        }
    }
}

impl RequestDescriptor {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: ensure_encoding(path),
            ..Self::default()
        }
    }

    /// Path plus `?query` when the query serializes to anything.
    pub fn effective_path(&self) -> String {
        let query = stringify(&self.query);
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, query)
        }
    }

    /// The declared content type, whatever the header's casing.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_ignore_case(CONTENT_TYPE_HEADER)
    }

    pub fn is_cacheable(&self) -> bool {
        !self.cache_ttl.is_zero()
    }
}

/// A configurable request that runs at most once.
///
/// Builder methods consume and return the request. Nothing is sent until
/// the request (or an [`Execution`] obtained from [`execute`](Self::execute))
/// is awaited; every later await observes the same outcome.
///
/// ```ignore
/// let users = client
///     .get("/api/users")
///     .query(&json!({ "page": 2 }))
///     .cache_tags(["users"])
///     .use_cache()
///     .await?;
/// ```
pub struct Request {
    client: Client,
    descriptor: RequestDescriptor,
    events: Arc<EventChannel>,
    execution: OnceLock<Execution>,
    build_error: Option<NetError>,
}

impl Request {
    pub(crate) fn new(client: Client, method: Method, path: &str) -> Self {
        Self {
            client,
            descriptor: RequestDescriptor::new(method, path),
            events: Arc::new(EventChannel::new()),
            execution: OnceLock::new(),
            build_error: None,
        }
    }

    /// Set a header, replacing a previous value under the same key.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.headers.insert(key, value);
        self
    }

    /// Set several headers. `None` values are skipped.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            if let Some(value) = value {
                self.descriptor.headers.insert(key, value);
            }
        }
        self
    }

    /// Declare the tags this request reads or affects, replacing earlier ones.
    pub fn cache_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<CacheTag>,
    {
        self.descriptor.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Merge query parameters. `params` must serialize to a map; its keys
    /// overwrite existing ones.
    pub fn query<T: Serialize + ?Sized>(mut self, params: &T) -> Self {
        match serde_json::to_value(params) {
            Ok(Value::Object(map)) => self.descriptor.query.extend(map),
            Ok(other) => {
                tracing::warn!(value = %other, "query parameters must be a map, ignored");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize query parameters");
                self.build_error = Some(NetError::JsonParseError);
            }
        }
        self
    }

    /// Set a single query parameter.
    pub fn query_param<V: Serialize>(mut self, key: impl Into<String>, value: V) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.descriptor.query.insert(key.into(), value);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize query parameter");
                self.build_error = Some(NetError::JsonParseError);
            }
        }
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.descriptor.body = body.into();
        self
    }

    /// Use a serialized value as the body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match RequestBody::json(value) {
            Ok(body) => self.descriptor.body = body,
            Err(err) => {
                tracing::warn!("failed to serialize request body");
                self.build_error = Some(err);
            }
        }
        self
    }

    /// Send a prebuilt multipart form.
    pub fn form(mut self, form: Form) -> Self {
        self.descriptor.body = RequestBody::Form(form);
        self
    }

    /// Build a multipart form from loose fields.
    ///
    /// Each value is cast to a sequence and appended field by field, with
    /// its own part options when it carries any. Fields with an empty name
    /// are skipped.
    pub fn form_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FormFieldValues>,
    {
        let mut form = self.client.new_form();

        for (name, values) in fields {
            let name = name.into();
            if name.is_empty() {
                continue;
            }
            let values: FormFieldValues = values.into();
            for field in values {
                form = form.append(name.clone(), field.value, field.options);
            }
        }

        self.descriptor.body = RequestBody::Form(form);
        self
    }

    /// Cache the response for [`DEFAULT_CACHE_TTL`].
    pub fn use_cache(self) -> Self {
        self.cache_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.descriptor.cache_ttl = ttl;
        self
    }

    /// Drop cached entries matching this request's tags right away.
    /// Has no effect unless tags were declared first.
    pub fn reset_cache(self, reset: bool) -> Self {
        if reset {
            if let Some(tags) = &self.descriptor.tags {
                self.client.cache().delete_by_tags(tags);
            }
        }
        self
    }

    pub fn content_type(self, value: impl Into<String>) -> Self {
        self.header(CONTENT_TYPE_HEADER, value)
    }

    /// Resolve to the body only (the default) or to the whole response.
    pub fn unwrap_body(mut self, unwrap: bool) -> Self {
        self.descriptor.unwrap = unwrap;
        self
    }

    pub fn encoding(mut self, encoding: ResponseEncoding) -> Self {
        self.descriptor.encoding = encoding;
        self
    }

    pub fn with_credentials(mut self, value: bool) -> Self {
        self.descriptor.with_credentials = Some(value);
        self
    }

    /// A zero duration means no timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.descriptor.timeout = Some(timeout).filter(|t| !t.is_zero());
        self
    }

    pub fn abort_signal(mut self, token: CancellationToken) -> Self {
        self.descriptor.abort = Some(token);
        self
    }

    pub fn on_request<F>(self, f: F) -> Self
    where
        F: Fn(&RequestDescriptor) + Send + Sync + 'static,
    {
        self.events.on_request(f);
        self
    }

    pub fn on_response<F>(self, f: F) -> Self
    where
        F: Fn(&ResponseValue) + Send + Sync + 'static,
    {
        self.events.on_response(f);
        self
    }

    pub fn on_error<F>(self, f: F) -> Self
    where
        F: Fn(&NetError) + Send + Sync + 'static,
    {
        self.events.on_error(f);
        self
    }

    pub fn on_done<F>(self, f: F) -> Self
    where
        F: Fn(Result<&ResponseValue, &NetError>) + Send + Sync + 'static,
    {
        self.events.on_done(f);
        self
    }

    /// The event channel, for registering listeners by [`ListenerId`] or
    /// removing them.
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    /// Remove one listener.
    pub fn off(self, id: ListenerId) -> Self {
        self.events.off(id);
        self
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> LoadState {
        self.events.state()
    }

    /// The shared execution of this request. The first call snapshots the
    /// descriptor; later calls return the same future. Nothing runs until
    /// the returned future is polled. From then on the pipeline runs on a
    /// spawned task, so dropping every awaiter (say, an outer timeout) does
    /// not stop it: the request still settles and fires `done`.
    pub fn execute(&self) -> Execution {
        self.execution
            .get_or_init(|| {
                let job = URLRequestJob::new(
                    self.client.clone(),
                    self.descriptor.clone(),
                    self.events.clone(),
                    self.build_error.clone(),
                );
                Execution::new(job.spawn())
            })
            .clone()
    }

    /// Set the body and execute. Once executed, the body is left alone and
    /// the stored execution is returned.
    pub fn send(mut self, body: impl Into<RequestBody>) -> Execution {
        if self.execution.get().is_none() {
            self.descriptor.body = body.into();
        }
        self.execute()
    }
}

impl IntoFuture for Request {
    type Output = Result<ResponseValue, NetError>;
    type IntoFuture = Execution;

    fn into_future(self) -> Self::IntoFuture {
        self.execute()
    }
}

impl IntoFuture for &Request {
    type Output = Result<ResponseValue, NetError>;
    type IntoFuture = Execution;

    fn into_future(self) -> Self::IntoFuture {
        self.execute()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("descriptor", &self.descriptor)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
