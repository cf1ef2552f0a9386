use axum::{
    extract::MatchedPath,
    http::{Request, Response},
};
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::Level;

/// Names request spans after the matched route and records the outcome on
/// the same span, so traces group by `POST /ingredients/add` rather than by
/// raw URL.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tracer;

impl<Body> MakeSpan<Body> for Tracer {
    fn make_span(&mut self, request: &Request<Body>) -> tracing::Span {
        let route = http_route(request);
        let span_name = format!("{} {}", request.method(), route);

        tracing::span!(
            Level::INFO,
            "server.request",
            otel.name = span_name,
            kind = "server",
            uri = %request.uri(),
            url.path = %request.uri().path(),
            url.query = request.uri().query(),
            http_version = ?request.version(),
            user_agent.original = request.headers().get("user-agent").and_then(|h| h.to_str().ok()),
            http.route = route,
            http.request.method = %request.method(),
            http.request.header.host = request.headers().get("host").and_then(|h| h.to_str().ok()),
            http.request.header.content_length = request.headers().get("content-length").and_then(|h| h.to_str().ok()),
            http.request.header.referer = request.headers().get("referer").and_then(|h| h.to_str().ok()),

            http.response.status_code = tracing::field::Empty,
            http.response.header.content_type = tracing::field::Empty,
        )
    }
}

impl<Body> OnResponse<Body> for Tracer {
    fn on_response(
        self,
        response: &Response<Body>,
        latency: std::time::Duration,
        span: &tracing::Span,
    ) {
        let status_code = response.status().as_u16();
        tracing::event!(
            Level::INFO,
            status = status_code,
            latency = format_args!("{} ms", latency.as_millis()),
            "finished processing request"
        );

        span.record("http.response.status_code", status_code);
        span.record(
            "http.response.header.content_type",
            response
                .headers()
                .get("content-type")
                .and_then(|h| h.to_str().ok()),
        );
    }
}

#[inline]
fn http_route<B>(req: &Request<B>) -> &str {
    req.extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "", |mp| mp.as_str())
}
