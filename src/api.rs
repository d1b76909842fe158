//! Unified API router
//!
//! Merges the module routers into a single axum `Router` with CORS and tracing.
//!
//! ## Endpoint Map
//!
//! | Prefix                  | Module     | Description                          |
//! |-------------------------|------------|--------------------------------------|
//! | `/health`               | api        | Load balancer health probe           |
//! | `/api/v1/events/*`      | events     | Catalog browse, create, approve, register |
//! | `/api/v1/submissions/*` | submission | Faculty submission workflows         |

use crate::events::{events_router, EventStore, EventsState};
use crate::submission::{submissions_router, SubmissionsState, WorkflowManager};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete HTTP application
///
/// Merges all module routers, adds CORS and request tracing, and returns a single
/// `Router` ready to be served by `axum::serve`.
pub fn build_app(
    store: Arc<EventStore>,
    manager: Arc<WorkflowManager>,
    cors_origins: &[String],
) -> Router {
    let cors = build_cors(cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .merge(events_router(EventsState { store }))
        .merge(submissions_router(SubmissionsState { manager }))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(crate::submission::handler::ACTOR_ID_HEADER),
            HeaderName::from_static(crate::submission::handler::ACTOR_NAME_HEADER),
            HeaderName::from_static(crate::submission::handler::ACTOR_CONTACT_HEADER),
        ]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}
