use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, FromRequest, Request};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};

use webmvc::{Dispatch, Dispatcher, HandlerMethod, Value, WebRequest};
use webmvc::instrument;

use crate::render::{error_response, value_response, MvcError};

const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub fn get(dispatcher: Arc<Dispatcher>, method: HandlerMethod) -> MethodRouter {
    on(MethodFilter::GET, dispatcher, method)
}

pub fn post(dispatcher: Arc<Dispatcher>, method: HandlerMethod) -> MethodRouter {
    on(MethodFilter::POST, dispatcher, method)
}

/// Serve `method` through `dispatcher` for requests matching `filter`.
pub fn on(filter: MethodFilter, dispatcher: Arc<Dispatcher>, method: HandlerMethod) -> MethodRouter {
    axum::routing::on(filter, move |request: Request| {
        let dispatcher = Arc::clone(&dispatcher);
        let method = method.clone();
        async move {
            let path = request.uri().path().to_owned();
            respond(dispatcher, method, request, &path).await
        }
    })
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

async fn respond(dispatcher: Arc<Dispatcher>, method: HandlerMethod, request: Request, path: &str) -> Response {
    match dispatch(dispatcher, method, request).await {
        Ok(value) => value_response(value),
        Err(e) => error_response(&e, path),
    }
}

/// Run the synchronous dispatch on a blocking worker, then wait for the
/// deferred result if the handler suspended.
pub async fn dispatch(dispatcher: Arc<Dispatcher>, method: HandlerMethod, request: Request) -> Result<Option<Value>, MvcError> {
    let (http_method, uri, headers) = (request.method().clone(), request.uri().clone(), request.headers().clone());
    let body = Bytes::from_request(request, &()).await.map_err(MvcError::Body)?;
    let body = String::from_utf8(body.to_vec()).map_err(MvcError::InvalidUtf8)?;
    let web_request = WebRequest::new(http_method, uri)
        .with_headers(headers)
        .with_body(body);

    let span = tracing::Span::current();
    let dispatched = tokio::task::spawn_blocking(move || {
        span.in_scope(|| dispatcher.dispatch(&method, web_request))
    }).await??;

    match dispatched {
        Dispatch::Completed(value) => Ok(value),
        Dispatch::Async(pending) => {
            let value = instrument!("deferred result"; pending.wait()).await?;
            Ok(Some(value))
        }
    }
}
