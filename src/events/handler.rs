//! HTTP handlers for the Events API
//!
//! Provides 6 REST endpoints over the catalog:
//! - GET    /api/v1/events                   — visible events (q, category, status)
//! - GET    /api/v1/events/stats             — aggregate statistics
//! - GET    /api/v1/events/:id               — event detail
//! - POST   /api/v1/events                   — create event (pending approval)
//! - POST   /api/v1/events/:id/status        — advance approval status
//! - POST   /api/v1/events/:id/registrations — record registrations

use crate::events::filter::{FilterParams, FilterSpec};
use crate::events::store::EventStore;
use crate::events::types::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Shared state for event handlers
#[derive(Clone)]
pub struct EventsState {
    pub store: Arc<EventStore>,
}

/// Create the events router with all REST endpoints
pub fn events_router(state: EventsState) -> Router {
    Router::new()
        .route("/api/v1/events", get(list_events).post(create_event))
        .route("/api/v1/events/stats", get(get_stats))
        .route("/api/v1/events/:id", get(get_event))
        .route("/api/v1/events/:id/status", post(advance_status))
        .route("/api/v1/events/:id/registrations", post(register))
        .with_state(state)
}

fn error_response(err: &crate::Error) -> Response {
    let (status, body) = ApiError::from_error(err);
    (status, Json(body)).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/v1/events
async fn list_events(
    State(state): State<EventsState>,
    Query(params): Query<FilterParams>,
) -> Response {
    let spec = match FilterSpec::try_from(params) {
        Ok(spec) => spec,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(message))).into_response()
        }
    };
    Json(state.store.list(&spec).await).into_response()
}

/// GET /api/v1/events/stats
async fn get_stats(State(state): State<EventsState>) -> impl IntoResponse {
    Json(state.store.stats().await)
}

/// GET /api/v1/events/:id
async fn get_event(State(state): State<EventsState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id).await {
        Some(event) => Json(event).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("Event {} not found", id))),
        )
            .into_response(),
    }
}

/// POST /api/v1/events
async fn create_event(
    State(state): State<EventsState>,
    Json(candidate): Json<NewEvent>,
) -> Response {
    match state.store.create(candidate).await {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/events/:id/status
async fn advance_status(
    State(state): State<EventsState>,
    Path(id): Path<String>,
    Json(request): Json<AdvanceStatusRequest>,
) -> Response {
    match state.store.advance_status(&id, request.status).await {
        Ok(event) => Json(event).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/events/:id/registrations
async fn register(
    State(state): State<EventsState>,
    Path(id): Path<String>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    match state.store.register(&id, request.seats).await {
        Ok(event) => Json(event).into_response(),
        Err(e) => error_response(&e),
    }
}
