//! Acting-user extraction.
//!
//! Reads `X-Actor-Id` / `X-Actor-Name` and injects an `Actor` into request
//! extensions for downstream handlers. Requests without both headers are
//! rejected before reaching a handler.

use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ACTOR_ID_HEADER, ACTOR_NAME_HEADER};
use crate::models::Actor;

/// Longest accepted actor id or name.
const MAX_ACTOR_FIELD_LEN: usize = 200;

pub async fn require_actor(mut req: Request<axum::body::Body>, next: Next) -> Response {
    match actor_from_headers(req.headers()) {
        Ok(actor) => {
            req.extensions_mut().insert(actor);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    let id = header_value(headers, ACTOR_ID_HEADER)?;
    let name = header_value(headers, ACTOR_NAME_HEADER)?;
    Ok(Actor::new(id, name))
}

fn header_value(headers: &HeaderMap, name: &'static str) -> Result<String, ApiError> {
    let value = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingActor(name))?;
    if value.chars().count() > MAX_ACTOR_FIELD_LEN {
        return Err(ApiError::Validation(format!("Header {name} is too long")));
    }
    Ok(value.to_string())
}
