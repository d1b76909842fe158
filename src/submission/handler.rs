//! HTTP handlers for the Submissions API
//!
//! Provides 5 REST endpoints driving a submission workflow:
//! - POST   /api/v1/submissions            — open a workflow
//! - GET    /api/v1/submissions/:id        — workflow snapshot
//! - PATCH  /api/v1/submissions/:id        — edit one draft field
//! - POST   /api/v1/submissions/:id/submit — submit for approval
//! - DELETE /api/v1/submissions/:id        — close and discard
//!
//! Authentication happens upstream; the identity provider forwards the
//! actor in `X-Actor-Id`, `X-Actor-Name` and `X-Actor-Contact`.

use crate::events::types::ApiError;
use crate::submission::draft::FieldUpdate;
use crate::submission::manager::WorkflowManager;
use crate::submission::service::{ActorProfile, StaticIdentity};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";
pub const ACTOR_CONTACT_HEADER: &str = "x-actor-contact";

/// Shared state for submission handlers
#[derive(Clone)]
pub struct SubmissionsState {
    pub manager: Arc<WorkflowManager>,
}

/// Create the submissions router
pub fn submissions_router(state: SubmissionsState) -> Router {
    Router::new()
        .route("/api/v1/submissions", post(open_submission))
        .route(
            "/api/v1/submissions/:id",
            get(get_submission)
                .patch(update_field)
                .delete(close_submission),
        )
        .route("/api/v1/submissions/:id/submit", post(submit))
        .with_state(state)
}

/// Actor forwarded by the identity provider, if any
fn actor_from_headers(headers: &HeaderMap) -> Option<ActorProfile> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut actor = ActorProfile::new(header(ACTOR_ID_HEADER)?, header(ACTOR_NAME_HEADER)?);
    actor.contact = header(ACTOR_CONTACT_HEADER);
    Some(actor)
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::not_found(format!("Submission {} not found", id))),
    )
        .into_response()
}

fn error_response(err: &crate::Error) -> Response {
    let (status, body) = ApiError::from_error(err);
    (status, Json(body)).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/v1/submissions
async fn open_submission(
    State(state): State<SubmissionsState>,
    headers: HeaderMap,
) -> Response {
    let identity = match actor_from_headers(&headers) {
        Some(actor) => StaticIdentity::new(actor),
        None => StaticIdentity::anonymous(),
    };
    let workflow = state.manager.open(Arc::new(identity)).await;
    (StatusCode::CREATED, Json(workflow.snapshot().await)).into_response()
}

/// GET /api/v1/submissions/:id
async fn get_submission(
    State(state): State<SubmissionsState>,
    Path(id): Path<String>,
) -> Response {
    match state.manager.get(&id).await {
        Some(workflow) => Json(workflow.snapshot().await).into_response(),
        None => not_found(&id),
    }
}

/// PATCH /api/v1/submissions/:id
async fn update_field(
    State(state): State<SubmissionsState>,
    Path(id): Path<String>,
    Json(update): Json<FieldUpdate>,
) -> Response {
    let Some(workflow) = state.manager.get(&id).await else {
        return not_found(&id);
    };
    match workflow.update_field(update).await {
        Ok(_) => Json(workflow.snapshot().await).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/submissions/:id/submit
async fn submit(State(state): State<SubmissionsState>, Path(id): Path<String>) -> Response {
    let Some(workflow) = state.manager.get(&id).await else {
        return not_found(&id);
    };
    match workflow.submit().await {
        Ok(_) => (StatusCode::CREATED, Json(workflow.snapshot().await)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/v1/submissions/:id
async fn close_submission(
    State(state): State<SubmissionsState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.manager.remove(&id).await {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(&id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::store::EventStore;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn make_app() -> (Router, Arc<EventStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(EventStore::new(dir.path().to_path_buf()).await.unwrap());
        let manager = Arc::new(WorkflowManager::new(store.clone(), Duration::from_secs(2)));
        (
            submissions_router(SubmissionsState { manager }),
            store,
            dir,
        )
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn open(app: &Router, with_actor: bool) -> String {
        let mut req = Request::builder().method("POST").uri("/api/v1/submissions");
        if with_actor {
            req = req
                .header(ACTOR_ID_HEADER, "fac-7")
                .header(ACTOR_NAME_HEADER, "Dr. Rao");
        }
        let resp = app
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["state"], "editing");
        assert_eq!(json["draft"]["price"], "Free");
        json["id"].as_str().unwrap().to_string()
    }

    async fn patch(app: &Router, id: &str, field: &str, value: &str) -> Response {
        let body = serde_json::json!({ "field": field, "value": value });
        app.clone()
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/api/v1/submissions/{}", id))
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn submit_req(app: &Router, id: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/submissions/{}/submit", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn fill(app: &Router, id: &str, capacity: &str) {
        for (field, value) in [
            ("title", "Tech Symposium 2025"),
            ("description", "Talks and demos"),
            ("date", "2025-03-15"),
            ("time", "10:00"),
            ("location", "Main Auditorium"),
            ("category", "Technical"),
            ("capacity", capacity),
        ] {
            assert_eq!(patch(app, id, field, value).await.status(), StatusCode::OK);
        }
    }

    #[test]
    fn test_actor_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(actor_from_headers(&headers).is_none());

        headers.insert(ACTOR_ID_HEADER, "fac-7".parse().unwrap());
        assert!(actor_from_headers(&headers).is_none());

        headers.insert(ACTOR_NAME_HEADER, "Dr. Rao".parse().unwrap());
        headers.insert(ACTOR_CONTACT_HEADER, "rao@campus.edu".parse().unwrap());
        let actor = actor_from_headers(&headers).unwrap();
        assert_eq!(actor.id, "fac-7");
        assert_eq!(actor.contact.as_deref(), Some("rao@campus.edu"));
    }

    #[tokio::test]
    async fn test_full_submission_flow() {
        let (app, store, _dir) = make_app().await;
        let id = open(&app, true).await;
        fill(&app, &id, "200").await;

        let resp = submit_req(&app, &id).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["state"], "confirmed");
        assert_eq!(json["created"]["capacity"], 200);
        assert_eq!(json["created"]["status"], "draft");
        assert_eq!(json["created"]["organizer"]["id"], "fac-7");

        let events = store.all().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Tech Symposium 2025");

        // Second submit is rejected while confirmed
        let resp = submit_req(&app, &id).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(store.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_capacity_returns_422() {
        let (app, store, _dir) = make_app().await;
        let id = open(&app, true).await;
        fill(&app, &id, "abc").await;

        let resp = submit_req(&app, &id).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert!(store.all().await.is_empty());

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/submissions/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["state"], "editing");
        assert_eq!(json["draft"]["capacity"], "abc");
        assert!(json["lastError"].as_str().unwrap().contains("capacity"));
    }

    #[tokio::test]
    async fn test_anonymous_submit_returns_401() {
        let (app, store, _dir) = make_app().await;
        let id = open(&app, false).await;
        fill(&app, &id, "200").await;

        let resp = submit_req(&app, &id).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected() {
        let (app, _store, _dir) = make_app().await;
        let id = open(&app, true).await;
        let resp = patch(&app, &id, "organizer", "someone else").await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_submission_returns_404() {
        let (app, _store, _dir) = make_app().await;
        let resp = submit_req(&app, "sub-missing").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_closes_submission() {
        let (app, _store, _dir) = make_app().await;
        let id = open(&app, true).await;

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/submissions/{}", id))
                .body(Body::empty())
                .unwrap()
        };
        let resp = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let resp = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
