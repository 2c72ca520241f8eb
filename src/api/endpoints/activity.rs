//! Activity feed endpoint.

use axum::extract::{Query, State};
use axum::Json;

use crate::api::endpoints::appointments::ActivityResponse;
use crate::api::error::ApiError;
use crate::api::types::{ActivityQuery, ApiContext};
use crate::db;

/// `GET /api/activity?limit=`: most recent entries first.
pub async fn recent(
    State(ctx): State<ApiContext>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let entries = db::recent_activity(&conn, query.effective_limit())?;
    Ok(Json(ActivityResponse { entries }))
}
