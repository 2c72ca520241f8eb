//! Shared types for the HTTP API layer.

use std::sync::Arc;

use serde::Deserialize;

use crate::core_state::CoreState;
use crate::models::{AppointmentStatus, AppointmentTime};

/// Header carrying the acting user's id.
pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";
/// Header carrying the acting user's display name.
pub const ACTOR_NAME_HEADER: &str = "X-Actor-Name";

/// Default number of entries returned by the activity feed.
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 50;
/// Upper bound on a single activity page.
pub const MAX_ACTIVITY_LIMIT: u32 = 500;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Request bodies and query strings
// ═══════════════════════════════════════════════════════════

/// `GET /api/appointments` query. Either `date`, or `from` + `to`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Comma-separated statuses, e.g. `scheduled,confirmed`.
    pub status: Option<String>,
}

impl ListQuery {
    /// Parse the `status` filter. Empty means any status.
    pub fn statuses(&self) -> Result<Vec<AppointmentStatus>, String> {
        let Some(raw) = self.status.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<AppointmentStatus>()
                    .map_err(|_| format!("Unknown status '{s}'"))
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<u32>,
}

impl ActivityQuery {
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .clamp(1, MAX_ACTIVITY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LateRequest {
    pub minutes: i64,
    #[serde(default)]
    pub reason: String,
}

/// Render a slot for activity messages.
pub fn describe_slot(date: &str, time: &AppointmentTime) -> String {
    match time {
        AppointmentTime::OnCall => format!("{date} (on-call)"),
        AppointmentTime::At(t) => format!("{date} {t}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_parses_list() {
        let q = ListQuery {
            status: Some("scheduled, confirmed".into()),
            ..ListQuery::default()
        };
        assert_eq!(
            q.statuses().unwrap(),
            vec![AppointmentStatus::Scheduled, AppointmentStatus::Confirmed]
        );
    }

    #[test]
    fn status_filter_rejects_unknown() {
        let q = ListQuery {
            status: Some("scheduled,pending".into()),
            ..ListQuery::default()
        };
        assert!(q.statuses().unwrap_err().contains("pending"));
    }

    #[test]
    fn missing_status_filter_means_any() {
        assert!(ListQuery::default().statuses().unwrap().is_empty());
    }

    #[test]
    fn activity_limit_clamped() {
        assert_eq!(ActivityQuery::default().effective_limit(), DEFAULT_ACTIVITY_LIMIT);
        assert_eq!(ActivityQuery { limit: Some(0) }.effective_limit(), 1);
        assert_eq!(
            ActivityQuery { limit: Some(10_000) }.effective_limit(),
            MAX_ACTIVITY_LIMIT
        );
    }

    #[test]
    fn late_request_reason_optional() {
        let req: LateRequest = serde_json::from_str(r#"{"minutes":15}"#).unwrap();
        assert_eq!(req.minutes, 15);
        assert!(req.reason.is_empty());
    }

    #[test]
    fn slot_description() {
        assert_eq!(
            describe_slot("2025-06-01", &"09:00".parse().unwrap()),
            "2025-06-01 09:00"
        );
        assert_eq!(
            describe_slot("2025-06-01", &AppointmentTime::OnCall),
            "2025-06-01 (on-call)"
        );
    }
}
