use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{HistoryFilter, ListingFilter, PropertyId, RequestId, RequestSubmission};
use super::engine::AllocationEngine;
use super::error::AllocationError;
use super::scoring::MatchCandidate;

#[derive(Clone)]
pub(crate) struct RouterState {
    pub(crate) engine: Arc<AllocationEngine>,
    pub(crate) match_limit: usize,
}

/// Router exposing the engine operations and read queries over HTTP.
///
/// `match_limit` caps the candidates returned by the matches route when the
/// caller does not pass `?limit=`.
pub fn allocation_router(engine: Arc<AllocationEngine>, match_limit: usize) -> Router {
    let state = RouterState {
        engine,
        match_limit: match_limit.max(1),
    };

    Router::new()
        .route(
            "/api/v1/allocations/requests",
            post(submit_handler).get(pending_handler),
        )
        .route("/api/v1/allocations/requests/:request_id", get(request_handler))
        .route(
            "/api/v1/allocations/requests/:request_id/matches",
            get(matches_handler),
        )
        .route(
            "/api/v1/allocations/requests/:request_id/progress",
            post(progress_handler),
        )
        .route(
            "/api/v1/allocations/requests/:request_id/confirm",
            post(confirm_handler),
        )
        .route(
            "/api/v1/allocations/requests/:request_id/cancel",
            post(cancel_handler),
        )
        .route("/api/v1/allocations/history", get(history_handler))
        .route("/api/v1/properties", get(listings_handler))
        .route("/api/v1/properties/summary", get(summary_handler))
        .with_state(state)
}

/// HTTP status for each engine failure.
pub fn status_for(error: &AllocationError) -> StatusCode {
    match error {
        AllocationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AllocationError::InvalidState { .. } | AllocationError::InsufficientInventory { .. } => {
            StatusCode::CONFLICT
        }
        AllocationError::RequestNotFound(_) | AllocationError::PropertyNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        AllocationError::InvariantViolation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: &AllocationError) -> Response {
    let message = match error {
        AllocationError::InsufficientInventory { property_id } => {
            format!("property {property_id} is no longer available; refresh matches")
        }
        other => other.to_string(),
    };
    let payload = json!({
        "error": message,
        "kind": error.kind(),
    });
    (status_for(error), Json(payload)).into_response()
}

/// Kind reported when the body or query string cannot be decoded.
const MALFORMED_REQUEST: &str = "malformed_request";

/// Extractor rejections use the same `{error, kind}` body as engine failures.
fn malformed_response(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "error": message,
        "kind": MALFORMED_REQUEST,
    });
    (status, Json(payload)).into_response()
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value)
        .map_err(|rejection| malformed_response(rejection.status(), rejection.body_text()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, Response> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| malformed_response(rejection.status(), rejection.body_text()))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MatchQuery {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmPayload {
    pub(crate) property_id: PropertyId,
}

#[derive(Debug, Serialize)]
pub(crate) struct MatchesView {
    pub(crate) request_id: RequestId,
    pub(crate) total_candidates: usize,
    pub(crate) candidates: Vec<MatchCandidate>,
}

pub(crate) async fn submit_handler(
    State(state): State<RouterState>,
    body: Result<Json<RequestSubmission>, JsonRejection>,
) -> Response {
    let submission = match json_body(body) {
        Ok(submission) => submission,
        Err(response) => return response,
    };
    match state.engine.submit_request(submission) {
        Ok(request) => (StatusCode::ACCEPTED, Json(request)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn pending_handler(State(state): State<RouterState>) -> Response {
    Json(state.engine.list_pending_requests()).into_response()
}

pub(crate) async fn request_handler(
    State(state): State<RouterState>,
    Path(request_id): Path<String>,
) -> Response {
    match state.engine.get_request(&RequestId(request_id)) {
        Ok(request) => Json(request).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn matches_handler(
    State(state): State<RouterState>,
    Path(request_id): Path<String>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> Response {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let request_id = RequestId(request_id);
    match state.engine.find_matches(&request_id) {
        Ok(mut candidates) => {
            let total_candidates = candidates.len();
            candidates.truncate(query.limit.unwrap_or(state.match_limit));
            Json(MatchesView {
                request_id,
                total_candidates,
                candidates,
            })
            .into_response()
        }
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn progress_handler(
    State(state): State<RouterState>,
    Path(request_id): Path<String>,
) -> Response {
    match state.engine.begin_progress(&RequestId(request_id)) {
        Ok(request) => Json(request).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn confirm_handler(
    State(state): State<RouterState>,
    Path(request_id): Path<String>,
    body: Result<Json<ConfirmPayload>, JsonRejection>,
) -> Response {
    let payload = match json_body(body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    match state
        .engine
        .confirm_allocation(&RequestId(request_id), &payload.property_id)
    {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn cancel_handler(
    State(state): State<RouterState>,
    Path(request_id): Path<String>,
) -> Response {
    match state.engine.cancel(&RequestId(request_id)) {
        Ok(request) => Json(request).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn history_handler(
    State(state): State<RouterState>,
    filter: Result<Query<HistoryFilter>, QueryRejection>,
) -> Response {
    match query_params(filter) {
        Ok(filter) => Json(state.engine.list_allocation_history(Some(&filter))).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn listings_handler(
    State(state): State<RouterState>,
    filter: Result<Query<ListingFilter>, QueryRejection>,
) -> Response {
    match query_params(filter) {
        Ok(filter) => Json(state.engine.list_listings(Some(&filter))).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn summary_handler(State(state): State<RouterState>) -> Response {
    Json(state.engine.inventory_summary()).into_response()
}
