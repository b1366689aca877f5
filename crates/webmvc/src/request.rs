use http::{HeaderMap, Method, Uri};

use crate::method::Value;
use crate::async_manager::WebAsyncManager;

/// The incoming request as seen by resolvers and return value handlers.
#[derive(Debug)]
pub struct WebRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
    async_manager: WebAsyncManager,
}

impl WebRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        WebRequest {
            method,
            uri,
            headers: HeaderMap::new(),
            body: String::new(),
            async_manager: WebAsyncManager::default(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
    pub fn uri(&self) -> &Uri {
        &self.uri
    }
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn async_manager(&self) -> &WebAsyncManager {
        &self.async_manager
    }
    pub fn async_manager_mut(&mut self) -> &mut WebAsyncManager {
        &mut self.async_manager
    }
    pub fn into_async_manager(self) -> WebAsyncManager {
        self.async_manager
    }
}

/// Per-invocation state shared between argument resolution and return value
/// handling. Attributes are keyed by type and dropped with the exchange.
#[derive(Debug, Default)]
pub struct Exchange {
    attributes: http::Extensions,
    request_handled: bool,
    value: Option<Value>,
}

impl Exchange {
    pub fn attributes(&self) -> &http::Extensions {
        &self.attributes
    }
    pub fn attributes_mut(&mut self) -> &mut http::Extensions {
        &mut self.attributes
    }

    pub fn is_request_handled(&self) -> bool {
        self.request_handled
    }
    pub fn set_request_handled(&mut self, handled: bool) {
        self.request_handled = handled;
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
    pub fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }
    pub fn take_value(&mut self) -> Option<Value> {
        self.value.take()
    }
}
