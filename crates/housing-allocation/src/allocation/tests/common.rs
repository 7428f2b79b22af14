use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::allocation::{
    AllocationEngine, AllocationRequest, CustomerId, InventoryStore, Priority, PropertyId,
    PropertyListing, PropertyType, RequestId, RequestStatus, RequestSubmission,
};

pub(super) fn listing(
    id: &str,
    property_type: PropertyType,
    location: &str,
    unit_value: u64,
    available: u32,
    allocated: u32,
    under_construction: u32,
) -> PropertyListing {
    PropertyListing {
        id: PropertyId::from(id),
        name: format!("{id} estate"),
        property_type,
        location: location.to_string(),
        unit_value,
        total_units: available + allocated + under_construction,
        available_units: available,
        allocated_units: allocated,
        under_construction_units: under_construction,
    }
}

/// Program inventory used across the engine tests.
pub(super) fn program_listings() -> Vec<PropertyListing> {
    vec![
        listing("PRP-LAG-001", PropertyType::Apartment, "Lagos", 45_000_000, 12, 5, 3),
        listing("PRP-LAG-002", PropertyType::Apartment, "Lagos", 52_000_000, 4, 6, 0),
        listing("PRP-ABJ-001", PropertyType::Duplex, "Abuja", 85_000_000, 2, 6, 0),
        listing("PRP-PHC-001", PropertyType::Terrace, "Port Harcourt", 30_000_000, 0, 10, 5),
        listing("PRP-KAN-001", PropertyType::Bungalow, "Kano", 25_000_000, 1, 5, 0),
    ]
}

pub(super) fn engine() -> AllocationEngine {
    let inventory = InventoryStore::with_listings(program_listings()).expect("valid inventory");
    AllocationEngine::new(inventory)
}

pub(super) fn shared_engine() -> Arc<AllocationEngine> {
    Arc::new(engine())
}

pub(super) fn submission() -> RequestSubmission {
    RequestSubmission {
        customer_id: "CUS-0001".to_string(),
        requested_property_type: "apartment".to_string(),
        budget: 45_000_000,
        location: "Lagos".to_string(),
        priority: Priority::Medium,
        request_date: Some(date(2024, 3, 1)),
    }
}

pub(super) fn request(
    property_type: PropertyType,
    budget: u64,
    location: &str,
) -> AllocationRequest {
    AllocationRequest {
        id: RequestId::from("REQ-TEST"),
        customer_id: CustomerId::from("CUS-TEST"),
        requested_property_type: property_type,
        budget,
        location: location.to_string(),
        priority: Priority::Medium,
        status: RequestStatus::Pending,
        request_date: date(2024, 3, 1),
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn assert_balanced(engine: &AllocationEngine) {
    for listing in engine.list_listings(None) {
        assert!(
            listing.is_balanced(),
            "listing {} out of balance: {listing:?}",
            listing.id
        );
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let body = to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
