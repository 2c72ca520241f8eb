//! Request logging middleware.
//!
//! Logs every API request with method, path, response status, latency and
//! the acting user. Runs innermost, after `require_actor` has injected the
//! `Actor`.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::models::Actor;

pub async fn log_request(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let actor_id = req
        .extensions()
        .get::<Actor>()
        .map(|a| a.id.clone())
        .unwrap_or_else(|| "-".to_string());
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%method, path = %path, status, elapsed_ms, actor = %actor_id, "API request failed");
    } else {
        tracing::info!(%method, path = %path, status, elapsed_ms, actor = %actor_id, "API request");
    }

    response
}
