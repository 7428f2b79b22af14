use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::allocation::{allocation_router, AllocationEngine, PropertyId};

fn router_with(engine: std::sync::Arc<AllocationEngine>) -> Router {
    allocation_router(engine, 2)
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn submission_payload() -> Value {
    json!({
        "customer_id": "CUS-0001",
        "requested_property_type": "Apartment",
        "budget": 45_000_000,
        "location": "Lagos",
        "priority": "high"
    })
}

#[tokio::test]
async fn submit_returns_accepted_request() {
    let app = router_with(shared_engine());

    let response = app
        .oneshot(post_json("/api/v1/allocations/requests", submission_payload()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = json_body(response).await;
    assert_eq!(body["id"], "REQ-000001");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["requested_property_type"], "apartment");
    assert_eq!(body["priority"], "high");
}

#[tokio::test]
async fn submit_with_bad_budget_is_unprocessable() {
    let app = router_with(shared_engine());
    let mut payload = submission_payload();
    payload["budget"] = json!(-5);

    let response = app
        .oneshot(post_json("/api/v1/allocations/requests", payload))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "validation");
    assert!(body["error"].as_str().expect("message").contains("budget"));
}

#[tokio::test]
async fn undecodable_bodies_use_the_error_envelope() {
    let engine = shared_engine();
    let mut payload = submission_payload();
    payload["budget"] = json!(1.5);

    let response = router_with(engine.clone())
        .oneshot(post_json("/api/v1/allocations/requests", payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "malformed_request");
    assert!(body["error"].is_string());

    let response = router_with(engine.clone())
        .oneshot(post_empty("/api/v1/allocations/requests"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json_body(response).await["kind"], "malformed_request");

    let request = engine.submit_request(submission()).expect("submit");
    let response = router_with(engine.clone())
        .oneshot(post_json(
            &format!("/api/v1/allocations/requests/{}/confirm", request.id),
            json!({}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["kind"], "malformed_request");
    assert!(engine.list_allocation_history(None).is_empty());
}

#[tokio::test]
async fn undecodable_query_uses_the_error_envelope() {
    let engine = shared_engine();
    let request = engine.submit_request(submission()).expect("submit");

    let response = router_with(engine)
        .oneshot(get(&format!(
            "/api/v1/allocations/requests/{}/matches?limit=abc",
            request.id
        )))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "malformed_request");
    assert!(body["error"]
        .as_str()
        .expect("message")
        .contains("query string"));
}

#[tokio::test]
async fn unknown_request_is_not_found() {
    let app = router_with(shared_engine());

    let response = app
        .oneshot(get("/api/v1/allocations/requests/REQ-404/matches"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["kind"], "request_not_found");
}

#[tokio::test]
async fn matches_respect_default_and_explicit_limits() {
    let engine = shared_engine();
    let request = engine.submit_request(submission()).expect("submit");
    let app = router_with(engine);

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/v1/allocations/requests/{}/matches",
            request.id
        )))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total_candidates"], 4);
    let candidates = body["candidates"].as_array().expect("candidates");
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["listing"]["id"], "PRP-LAG-001");
    assert_eq!(candidates[0]["score"], 100);

    let response = app
        .oneshot(get(&format!(
            "/api/v1/allocations/requests/{}/matches?limit=1",
            request.id
        )))
        .await
        .expect("response");
    let body = json_body(response).await;
    assert_eq!(body["candidates"].as_array().expect("candidates").len(), 1);
}

#[tokio::test]
async fn confirm_creates_record_and_conflicts_when_sold_out() {
    let engine = shared_engine();
    let request = engine.submit_request(submission()).expect("submit");
    let app = router_with(engine.clone());

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/allocations/requests/{}/confirm", request.id),
            json!({ "property_id": "PRP-PHC-001" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "insufficient_inventory");
    assert!(body["error"]
        .as_str()
        .expect("message")
        .contains("refresh matches"));

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/allocations/requests/{}/confirm", request.id),
            json!({ "property_id": "PRP-LAG-001" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["property_id"], "PRP-LAG-001");
    assert_eq!(body["value"], 45_000_000);

    let available = engine
        .inventory()
        .get_listing(&PropertyId::from("PRP-LAG-001"))
        .expect("listing")
        .available_units;
    assert_eq!(available, 11);

    let response = app
        .oneshot(post_empty(&format!(
            "/api/v1/allocations/requests/{}/cancel",
            request.id
        )))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["kind"], "invalid_state");
}

#[tokio::test]
async fn progress_then_cancel_updates_status() {
    let engine = shared_engine();
    let request = engine.submit_request(submission()).expect("submit");
    let app = router_with(engine);

    let response = app
        .clone()
        .oneshot(post_empty(&format!(
            "/api/v1/allocations/requests/{}/progress",
            request.id
        )))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "in-progress");

    let response = app
        .clone()
        .oneshot(post_empty(&format!(
            "/api/v1/allocations/requests/{}/cancel",
            request.id
        )))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "cancelled");

    let response = app
        .oneshot(get("/api/v1/allocations/requests"))
        .await
        .expect("response");
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn history_query_filters_by_customer() {
    let engine = shared_engine();
    let request = engine.submit_request(submission()).expect("submit");
    engine
        .confirm_allocation(&request.id, &PropertyId::from("PRP-LAG-001"))
        .expect("confirm");
    let app = router_with(engine);

    let response = app
        .clone()
        .oneshot(get("/api/v1/allocations/history?customer_id=CUS-0001"))
        .await
        .expect("response");
    let body = json_body(response).await;
    assert_eq!(body.as_array().expect("records").len(), 1);
    assert_eq!(body[0]["request_id"], request.id.0.as_str());

    let response = app
        .oneshot(get("/api/v1/allocations/history?property_id=PRP-ABJ-001"))
        .await
        .expect("response");
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn property_listing_and_summary_routes() {
    let app = router_with(shared_engine());

    let response = app
        .clone()
        .oneshot(get(
            "/api/v1/properties?property_type=apartment&location=Lagos&available_only=true",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .expect("listings")
        .iter()
        .filter_map(|listing| listing["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["PRP-LAG-001", "PRP-LAG-002"]);

    let response = app
        .oneshot(get("/api/v1/properties/summary"))
        .await
        .expect("response");
    let body = json_body(response).await;
    assert_eq!(body["listings"], 5);
    assert_eq!(body["available_units"], 19);
}
