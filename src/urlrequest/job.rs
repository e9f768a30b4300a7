use crate::base::neterror::NetError;
use crate::client::Client;
use crate::http::pathencoding::decode_for_display;
use crate::http::requestbody::RequestBody;
use crate::http::response::{HttpResponse, ResponseValue};
use crate::transport::{TransportRequest, WireBody};
use crate::urlrequest::events::EventChannel;
use crate::urlrequest::request::{RequestDescriptor, CONTENT_TYPE_HEADER};
use http::Method;
use serde_json::Value;
use std::sync::Arc;

/// One run of the request pipeline over a descriptor snapshot.
pub(crate) struct URLRequestJob {
    client: Client,
    descriptor: RequestDescriptor,
    events: Arc<EventChannel>,
    build_error: Option<NetError>,
}

impl URLRequestJob {
    pub(crate) fn new(
        client: Client,
        descriptor: RequestDescriptor,
        events: Arc<EventChannel>,
        build_error: Option<NetError>,
    ) -> Self {
        Self {
            client,
            descriptor,
            events,
            build_error,
        }
    }

    /// Run the pipeline on its own task. Once started it settles even when
    /// every awaiter has gone away; a panic is resumed in the awaiter.
    pub(crate) async fn spawn(self) -> Result<ResponseValue, NetError> {
        match tokio::spawn(self.run()).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::debug!(error = %e, "request task cancelled");
                Err(NetError::Aborted)
            }
        }
    }

    async fn run(self) -> Result<ResponseValue, NetError> {
        self.events.emit_request(&self.descriptor);

        let result = self.start().await;
        self.events.settle(result.as_ref());
        result
    }

    async fn start(&self) -> Result<ResponseValue, NetError> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }

        let d = &self.descriptor;
        let path = d.effective_path();
        let cache = self.client.cache();

        if d.is_cacheable() {
            if let Some(value) = cache.get(&path) {
                tracing::debug!(path = %path, "cache hit");
                return Ok(value);
            }
            tracing::debug!(path = %path, "cache miss");
        }

        let request = self.transport_request(path.clone())?;

        if self.client.is_verbose() {
            tracing::info!(
                method = %request.method,
                path = %decode_for_display(&request.path),
                body = ?request.body.as_text(),
                headers = ?request.headers,
                "sending request"
            );
        }

        let raw = self.client.transport().send(request).await?;
        let response = HttpResponse::parse(raw).check_status()?;
        let value = ResponseValue::unwrap_from(response, d.unwrap);

        if d.is_cacheable() {
            let tags = d.tags.as_deref().unwrap_or_default();
            cache.set(path.clone(), value.clone(), tags, d.cache_ttl);
        }

        // Mutations invalidate only once they succeeded.
        if let Some(tags) = &d.tags {
            if d.method != Method::GET {
                let removed = cache.delete_by_tags(tags);
                tracing::debug!(path = %path, removed, "invalidated after mutation");
            }
        }

        Ok(value)
    }

    fn transport_request(&self, path: String) -> Result<TransportRequest, NetError> {
        let d = &self.descriptor;
        let mut headers = d.headers.clone();

        let body = match &d.body {
            RequestBody::Empty | RequestBody::Json(Value::Null) => WireBody::Empty,
            RequestBody::Json(value) => {
                if d.content_type().is_none() {
                    headers.insert(CONTENT_TYPE_HEADER, "application/json");
                }
                let text = serde_json::to_string(value).map_err(|_| NetError::JsonParseError)?;
                WireBody::Text(text)
            }
            RequestBody::Text(text) => WireBody::Text(text.clone()),
            RequestBody::Bytes(bytes) => WireBody::Bytes(bytes.clone()),
            RequestBody::Form(form) => WireBody::Form(form.clone()),
        };

        Ok(TransportRequest {
            path,
            method: d.method.clone(),
            headers,
            body,
            encoding: d.encoding,
            timeout: d.timeout,
            with_credentials: d.with_credentials.or(self.client.default_credentials()),
            abort: d.abort.clone(),
        })
    }
}
