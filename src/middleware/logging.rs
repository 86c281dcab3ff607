//! Request logging middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{debug, info, warn};

/// Log every request with its route template, status and latency
///
/// Judge devices poll track snapshots constantly, so successful reads are
/// logged at debug. Rejected submissions (409, 422) are warnings since they
/// usually mean a judge device is out of step with the meet.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0);

    if status.is_server_error() {
        warn!(%method, %path, %route, status = status.as_u16(), %duration_ms, "Request failed");
    } else if matches!(
        status,
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        warn!(%method, %path, %route, status = status.as_u16(), %duration_ms, "Request rejected");
    } else if method == axum::http::Method::GET && status.is_success() {
        debug!(%method, %path, %route, status = status.as_u16(), %duration_ms, "Request completed");
    } else {
        info!(%method, %path, %route, status = status.as_u16(), %duration_ms, "Request completed");
    }

    response
}
