use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::super::domain::{PropertyId, PropertyListing, PropertyType};
use super::super::error::ValidationError;

/// Failure while reading a property onboarding export.
#[derive(Debug, thiserror::Error)]
pub enum ListingImportError {
    #[error("failed to read listing export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid listing CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("listing row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: ValidationError,
    },
}

/// Reads property onboarding exports into listings ready for registration.
///
/// Expected header:
/// `id,name,property_type,location,unit_value,total_units,available_units,allocated_units,under_construction_units`
pub struct ListingImporter;

impl ListingImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PropertyListing>, ListingImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PropertyListing>, ListingImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut listings = Vec::new();

        for (index, record) in csv_reader.deserialize::<ListingRow>().enumerate() {
            let row = record?;
            // header is line 1
            let listing = row
                .into_listing()
                .map_err(|source| ListingImportError::InvalidRow {
                    row: index + 2,
                    source,
                })?;
            listings.push(listing);
        }

        Ok(listings)
    }
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    id: String,
    name: String,
    property_type: String,
    location: String,
    unit_value: u64,
    total_units: u32,
    available_units: u32,
    // Exports omit these columns (or leave them blank) for brand-new estates.
    #[serde(default)]
    allocated_units: Option<u32>,
    #[serde(default)]
    under_construction_units: Option<u32>,
}

impl ListingRow {
    fn into_listing(self) -> Result<PropertyListing, ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingPropertyId);
        }
        let property_type: PropertyType = self.property_type.parse()?;

        Ok(PropertyListing {
            id: PropertyId(self.id),
            name: self.name,
            property_type,
            location: self.location,
            unit_value: self.unit_value,
            total_units: self.total_units,
            available_units: self.available_units,
            allocated_units: self.allocated_units.unwrap_or(0),
            under_construction_units: self.under_construction_units.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
id,name,property_type,location,unit_value,total_units,available_units,allocated_units,under_construction_units
PRP-LAG-001, Lekki Gardens Phase II ,Apartment,Lagos,45000000,20,12,5,3
PRP-ABJ-002,Gwarinpa Estate,duplex,Abuja,85000000,10,0,10,0
";

    #[test]
    fn parses_rows_and_normalizes_types() {
        let listings = ListingImporter::from_reader(EXPORT.as_bytes()).expect("export parses");

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, PropertyId::from("PRP-LAG-001"));
        assert_eq!(listings[0].name, "Lekki Gardens Phase II");
        assert_eq!(listings[0].property_type, PropertyType::Apartment);
        assert!(listings[0].is_balanced());
        assert_eq!(listings[1].property_type, PropertyType::Duplex);
        assert!(!listings[1].has_availability());
    }

    #[test]
    fn reports_row_number_for_unknown_property_type() {
        let export = "\
id,name,property_type,location,unit_value,total_units,available_units
PRP-1,Ok,bungalow,Kano,1000,1,1
PRP-2,Bad,castle,Kano,1000,1,1
";

        match ListingImporter::from_reader(export.as_bytes()) {
            Err(ListingImportError::InvalidRow {
                row: 3,
                source: ValidationError::UnknownPropertyType(kind),
            }) => assert_eq!(kind, "castle"),
            other => panic!("expected invalid row error, got {other:?}"),
        }
    }

    #[test]
    fn surfaces_csv_errors_for_non_numeric_counts() {
        let export = "\
id,name,property_type,location,unit_value,total_units,available_units
PRP-1,Ok,bungalow,Kano,lots,1,1
";

        assert!(matches!(
            ListingImporter::from_reader(export.as_bytes()),
            Err(ListingImportError::Csv(_))
        ));
    }
}
