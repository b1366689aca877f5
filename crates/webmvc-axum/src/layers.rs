use axum::Router;
use axum::body::Body;
use axum::http::Request;
use tower_http::trace as tower_trace;


/// Request tracing and panic recovery around `router`.
pub fn with_layers(router: Router) -> Router {
    router
        .layer(tower_http::catch_panic::CatchPanicLayer::new())
        .layer(tower_trace::TraceLayer::new_for_http()
            .make_span_with(|request: &Request<Body>| {
                tracing::debug_span!(
                    "request", method = %request.method(), uri = %request.uri(), version = ?request.version(),
                )
            })
            .on_request(tower_trace::DefaultOnRequest::new())
            .on_response(
                tower_trace::DefaultOnResponse::new()
                    .latency_unit(tower_http::LatencyUnit::Micros)
            ))
}
