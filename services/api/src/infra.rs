use chrono::NaiveDate;
use housing_allocation::allocation::{
    InventoryStore, ListingImporter, PropertyId, PropertyListing, PropertyType,
};
use housing_allocation::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Program estates used to seed the service and the CLI when no export is given.
pub(crate) fn demo_listings() -> Vec<PropertyListing> {
    vec![
        estate(
            "PRP-LAG-001",
            "Lekki Gardens Phase 2",
            PropertyType::Apartment,
            "Lagos",
            45_000_000,
            [12, 5, 3],
        ),
        estate(
            "PRP-LAG-002",
            "Ikoyi Court",
            PropertyType::Apartment,
            "Lagos",
            52_000_000,
            [4, 6, 0],
        ),
        estate(
            "PRP-LAG-003",
            "Ajah Terraces",
            PropertyType::Terrace,
            "Lagos",
            38_000_000,
            [6, 2, 8],
        ),
        estate(
            "PRP-ABJ-001",
            "Gwarinpa Heights",
            PropertyType::Duplex,
            "Abuja",
            85_000_000,
            [2, 6, 0],
        ),
        estate(
            "PRP-ABJ-002",
            "Maitama Residences",
            PropertyType::Mansion,
            "Abuja",
            240_000_000,
            [1, 1, 2],
        ),
        estate(
            "PRP-PHC-001",
            "Rumuola Terraces",
            PropertyType::Terrace,
            "Port Harcourt",
            30_000_000,
            [0, 10, 5],
        ),
        estate(
            "PRP-KAN-001",
            "Nassarawa Bungalows",
            PropertyType::Bungalow,
            "Kano",
            25_000_000,
            [1, 5, 0],
        ),
        estate(
            "PRP-ENU-001",
            "Independence Layout",
            PropertyType::Bungalow,
            "Enugu",
            28_000_000,
            [3, 1, 4],
        ),
    ]
}

fn estate(
    id: &str,
    name: &str,
    property_type: PropertyType,
    location: &str,
    unit_value: u64,
    [available, allocated, under_construction]: [u32; 3],
) -> PropertyListing {
    PropertyListing {
        id: PropertyId::from(id),
        name: name.to_string(),
        property_type,
        location: location.to_string(),
        unit_value,
        total_units: available + allocated + under_construction,
        available_units: available,
        allocated_units: allocated,
        under_construction_units: under_construction,
    }
}

/// Builds the inventory from a listing export, or the demo estates without one.
pub(crate) fn load_inventory(listings: Option<&Path>) -> Result<InventoryStore, AppError> {
    let listings = match listings {
        Some(path) => ListingImporter::from_path(path)?,
        None => demo_listings(),
    };
    Ok(InventoryStore::with_listings(listings)?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_inventory_is_balanced_and_registrable() {
        let store = load_inventory(None).expect("demo inventory registers");
        let summary = store.summary();

        assert_eq!(summary.listings, demo_listings().len());
        assert_eq!(
            summary.available_units + summary.allocated_units + summary.under_construction_units,
            summary.total_units
        );
    }

    #[test]
    fn demo_inventory_covers_program_regions() {
        let listings = demo_listings();
        for region in ["Lagos", "Abuja", "Port Harcourt", "Kano", "Enugu"] {
            assert!(
                listings.iter().any(|listing| listing.located_in(region)),
                "no demo estate in {region}"
            );
        }
    }

    #[test]
    fn missing_export_is_an_import_error() {
        match load_inventory(Some(Path::new("/nonexistent/listings.csv"))) {
            Err(AppError::Import(_)) => {}
            Err(other) => panic!("expected import error, got {other}"),
            Ok(_) => panic!("expected import error"),
        }
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(
            parse_date(" 2024-03-01 ").expect("valid"),
            NaiveDate::from_ymd_opt(2024, 3, 1).expect("date")
        );
        assert!(parse_date("01/03/2024").is_err());
    }
}
