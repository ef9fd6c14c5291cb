use std::time::Instant;

use axum::body::{Body, HttpBody};
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use http_body_util::{BodyExt, Limited};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Bodies at or above this size are summarised instead of logged.
const MAX_LOGGED_BODY: usize = 1024;

/// Wrap each request in an `http_request` span tagged with a trace id.
///
/// The id comes from an incoming `x-trace-id` header when it is a valid UUID
/// and is generated otherwise; it is echoed on the response.
pub async fn trace_middleware(req: Request, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let (mut parts, body) = req.into_parts();
        let body = log_body("request", &parts.headers, body).await;
        if let Some(v) = &trace_header {
            parts.headers.insert(X_TRACE_ID, v.clone());
        }

        let response = next.run(Request::from_parts(parts, body)).await;

        let (mut parts, body) = response.into_parts();
        let body = log_body("response", &parts.headers, body).await;
        if let Some(v) = trace_header {
            parts.headers.insert(X_TRACE_ID, v);
        }

        info!(
            status = parts.status.as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );
        Response::from_parts(parts, body)
    }
    .instrument(span)
    .await
}

/// Log a small JSON body. Only that case is buffered; anything else, or a body
/// of unknown length, streams through untouched so downstream limits apply.
async fn log_body(direction: &str, headers: &HeaderMap, body: Body) -> Body {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let size = declared_len(headers, &body);

    let small_json = content_type.contains("application/json")
        && size.is_some_and(|n| n < MAX_LOGGED_BODY as u64);
    if !small_json {
        if size != Some(0) {
            info!(content_type, size = ?size, "{direction} body not logged");
        }
        return body;
    }

    match Limited::new(body, MAX_LOGGED_BODY).collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            if let Ok(text) = std::str::from_utf8(&bytes) {
                info!("{direction} body: {text}");
            }
            Body::from(bytes)
        }
        Err(e) => {
            warn!(error = %e, "failed to buffer {direction} body");
            Body::empty()
        }
    }
}

fn declared_len(headers: &HeaderMap, body: &Body) -> Option<u64> {
    body.size_hint().exact().or_else(|| {
        headers
            .get(header::CONTENT_LENGTH)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    })
}
