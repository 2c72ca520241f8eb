//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! CORS → Actor extraction → Request logger → Handler

use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the scheduling API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let scheduling = Router::new()
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route(
            "/appointments/upcoming",
            get(endpoints::appointments::upcoming),
        )
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail).put(endpoints::appointments::update),
        )
        .route(
            "/appointments/:id/reschedule",
            post(endpoints::appointments::reschedule),
        )
        .route(
            "/appointments/:id/status",
            post(endpoints::appointments::change_status),
        )
        .route(
            "/appointments/:id/late",
            post(endpoints::appointments::mark_late).delete(endpoints::appointments::revert_late),
        )
        .route(
            "/appointments/:id/follow-up",
            get(endpoints::appointments::follow_up),
        )
        .route(
            "/appointments/:id/activity",
            get(endpoints::appointments::activity),
        )
        .route("/activity", get(endpoints::activity::recent))
        .with_state(ctx.clone())
        // Innermost first, outermost last.
        .layer(axum::middleware::from_fn(middleware::audit::log_request))
        .layer(axum::middleware::from_fn(middleware::actor::require_actor));

    // No actor needed to check liveness.
    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_request));

    Router::new()
        .nest("/api", scheduling)
        .nest("/api", open)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-actor-id"),
            HeaderName::from_static("x-actor-name"),
        ])
        .allow_origin(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::types::{ACTOR_ID_HEADER, ACTOR_NAME_HEADER};
    use crate::models::{format_calendar_date, local_today};

    /// CoreState backed by a database file in a temp dir.
    /// The tempdir guard must be kept alive for the duration of the test.
    fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let core = CoreState::from(tmp.path().join("appointments.db"));
        (Arc::new(core), tmp)
    }

    fn make_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_ID_HEADER, "u-1")
            .header(ACTOR_NAME_HEADER, "Front Desk");
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn book(app: &Router, name: &str, date: &str, time: &str) -> Value {
        let (status, json) = send(
            app,
            make_request(
                "POST",
                "/api/appointments",
                Some(json!({ "patientName": name, "date": date, "time": time })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json
    }

    #[tokio::test]
    async fn health_needs_no_actor() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(!json["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_actor_returns_400() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        let req = Request::builder()
            .uri("/api/appointments?date=2025-06-01")
            .header(ACTOR_ID_HEADER, "u-1")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "ACTOR_REQUIRED");
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        let (status, _) = send(&app, make_request("GET", "/api/nonexistent", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_appointment_returns_404() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        let (status, json) = send(&app, make_request("GET", "/api/appointments/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn create_validation_returns_400() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        let (status, json) = send(
            &app,
            make_request(
                "POST",
                "/api/appointments",
                Some(json!({ "patientName": "Ana", "date": "2025-06-01", "time": "9:00" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn booking_delay_and_lifecycle_flow() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        let a = book(&app, "Ana Ruiz", "2025-06-01", "09:00").await;
        assert!(a["conflict"].is_null());
        let a_id = a["id"].as_str().unwrap().to_string();
        assert_eq!(a["appointment"]["id"], a_id.as_str());
        assert_eq!(a["appointment"]["status"], "scheduled");

        let (status, stored) = send(
            &app,
            make_request("GET", &format!("/api/appointments/{a_id}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stored, a["appointment"]);

        let b = book(&app, "Ben Ode", "2025-06-01", "09:00").await;
        assert_eq!(b["conflict"]["conflictingId"], a_id.as_str());
        assert_eq!(b["conflict"]["patientName"], "Ana Ruiz");

        let (status, late) = send(
            &app,
            make_request(
                "POST",
                &format!("/api/appointments/{a_id}/late"),
                Some(json!({ "minutes": 15, "reason": "Traffic" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(late["time"], "09:15");
        assert_eq!(late["originalTime"], "09:00");
        assert_eq!(late["isLate"], true);
        assert_eq!(late["delayReason"], "Traffic");

        let (status, reverted) = send(
            &app,
            make_request("DELETE", &format!("/api/appointments/{a_id}/late"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reverted["time"], "09:00");
        assert_eq!(reverted["isLate"], false);
        assert!(reverted["originalTime"].is_null());

        let (status, done) = send(
            &app,
            make_request(
                "POST",
                &format!("/api/appointments/{a_id}/status"),
                Some(json!({ "status": "completed" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["followUpSuggested"], true);
        assert_eq!(done["appointment"]["status"], "completed");

        let (status, json) = send(
            &app,
            make_request(
                "POST",
                &format!("/api/appointments/{a_id}/status"),
                Some(json!({ "status": "cancelled" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "INVALID_TRANSITION");

        let (status, draft) = send(
            &app,
            make_request("GET", &format!("/api/appointments/{a_id}/follow-up"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(draft["isFollowUp"], true);
        assert_eq!(draft["previousAppointmentId"], a_id.as_str());
        assert_eq!(draft["patientName"], "Ana Ruiz");

        let (status, history) = send(
            &app,
            make_request("GET", &format!("/api/appointments/{a_id}/activity"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let actions: Vec<&str> = history["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["action"].as_str().unwrap())
            .collect();
        assert_eq!(
            actions,
            vec!["created", "marked_late", "late_reverted", "status_changed"]
        );
        assert_eq!(history["entries"][0]["actorName"], "Front Desk");

        let (status, feed) = send(&app, make_request("GET", "/api/activity?limit=2", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(feed["entries"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reschedule_and_edit() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        let a = book(&app, "Ana Ruiz", "2025-06-01", "09:00").await;
        let a_id = a["id"].as_str().unwrap().to_string();
        let b = book(&app, "Ben Ode", "2025-06-01", "10:00").await;

        let (status, moved) = send(
            &app,
            make_request(
                "POST",
                &format!("/api/appointments/{a_id}/reschedule"),
                Some(json!({ "date": "2025-06-01", "time": "10:00" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["appointment"]["time"], "10:00");
        assert_eq!(moved["conflict"]["conflictingId"], b["id"]);

        let (status, edited) = send(
            &app,
            make_request(
                "PUT",
                &format!("/api/appointments/{a_id}"),
                Some(json!({ "notes": "Bring x-rays", "doctorName": "Dr. Chen" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["appointment"]["notes"], "Bring x-rays");
        assert_eq!(edited["appointment"]["doctorName"], "Dr. Chen");
        assert!(edited["conflict"].is_null());
    }

    #[tokio::test]
    async fn list_by_date_and_range() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        book(&app, "Ana", "2025-06-01", "10:00").await;
        let early = book(&app, "Ben", "2025-06-01", "08:30").await;
        book(&app, "Cy", "2025-06-03", "09:00").await;

        let (status, day) = send(&app, make_request("GET", "/api/appointments?date=2025-06-01", None)).await;
        assert_eq!(status, StatusCode::OK);
        let list = day["appointments"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], early["id"]);

        let early_id = early["id"].as_str().unwrap();
        send(
            &app,
            make_request(
                "POST",
                &format!("/api/appointments/{early_id}/status"),
                Some(json!({ "status": "cancelled" })),
            ),
        )
        .await;

        let (status, range) = send(
            &app,
            make_request(
                "GET",
                "/api/appointments?from=2025-06-01&to=2025-06-03&status=scheduled,confirmed",
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = range["appointments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["patientName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Ana", "Cy"]);

        let (status, _) = send(&app, make_request("GET", "/api/appointments", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            make_request("GET", "/api/appointments?date=2025-06-01&status=pending", None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upcoming_starts_today() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let today = format_calendar_date(local_today());

        book(&app, "Ana", &today, "09:00").await;

        let (status, json) = send(&app, make_request("GET", "/api/appointments/upcoming", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["from"], today.as_str());
        assert_eq!(json["days"], 7);
        assert_eq!(json["appointments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_status_value_returns_400() {
        let (core, _tmp) = test_core();
        let app = api_router(core);
        let a = book(&app, "Ana", "2025-06-01", "09:00").await;
        let id = a["id"].as_str().unwrap();

        let (status, json) = send(
            &app,
            make_request(
                "POST",
                &format!("/api/appointments/{id}/status"),
                Some(json!({ "status": "done" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn unreachable_store_returns_503() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let core = Arc::new(CoreState::from(blocker.join("appointments.db")));
        let app = api_router(core);

        let response = app
            .oneshot(make_request("GET", "/api/appointments?date=2025-06-01", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get("Retry-After").is_some());
    }

    #[tokio::test]
    async fn cors_preflight_allows_actor_headers() {
        let (core, _tmp) = test_core();
        let app = api_router(core);

        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/appointments")
            .header("Origin", "http://localhost:5173")
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "x-actor-id,x-actor-name")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
