//! Canonical property inventory.
//!
//! Every count mutation funnels through [`apply_delta`], which re-checks that
//! the three status buckets still add up to `total_units` before anything is
//! written back. Listings are replaced whole under the write lock, so readers
//! never see a half-applied delta.

mod import;

pub use import::{ListingImportError, ListingImporter};

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{error, info};

use super::domain::{CountDelta, InventorySummary, ListingFilter, PropertyId, PropertyListing};
use super::error::{AllocationError, ValidationError};

type Entries = BTreeMap<PropertyId, Entry>;

#[derive(Debug)]
struct Entry {
    listing: PropertyListing,
    /// Next unit number handed out by `allocate_unit`. Never decreases, so a
    /// unit returned to the pool is reissued under a fresh number.
    next_unit: u32,
}

/// One unit taken out of the available pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AllocatedUnit {
    pub(crate) listing: PropertyListing,
    pub(crate) unit_number: u32,
}

#[derive(Debug, Default)]
pub struct InventoryStore {
    listings: RwLock<Entries>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from onboarding records, rejecting the first invalid one.
    pub fn with_listings<I>(listings: I) -> Result<Self, AllocationError>
    where
        I: IntoIterator<Item = PropertyListing>,
    {
        let store = Self::new();
        for listing in listings {
            store.register(listing)?;
        }
        Ok(store)
    }

    /// Accepts a listing handed over by property onboarding.
    ///
    /// Units already allocated at onboarding occupy numbers `1..=allocated_units`.
    pub fn register(&self, listing: PropertyListing) -> Result<PropertyListing, AllocationError> {
        validate_registration(&listing)?;

        let mut listings = self.write();
        if listings.contains_key(&listing.id) {
            return Err(ValidationError::DuplicateListing(listing.id).into());
        }

        info!(
            property_id = %listing.id,
            total_units = listing.total_units,
            available_units = listing.available_units,
            "property registered"
        );
        listings.insert(
            listing.id.clone(),
            Entry {
                listing: listing.clone(),
                next_unit: listing.allocated_units.saturating_add(1),
            },
        );
        Ok(listing)
    }

    pub fn get_listing(&self, id: &PropertyId) -> Result<PropertyListing, AllocationError> {
        self.read()
            .get(id)
            .map(|entry| entry.listing.clone())
            .ok_or_else(|| AllocationError::PropertyNotFound(id.clone()))
    }

    pub fn contains(&self, id: &PropertyId) -> bool {
        self.read().contains_key(id)
    }

    /// All listings matching `filter`, ordered by id.
    pub fn list(&self, filter: &ListingFilter) -> Vec<PropertyListing> {
        self.read()
            .values()
            .map(|entry| &entry.listing)
            .filter(|listing| filter.matches(listing))
            .cloned()
            .collect()
    }

    /// Listings with at least one available unit, optionally narrowed further.
    pub fn list_available(&self, filter: Option<&ListingFilter>) -> Vec<PropertyListing> {
        self.read()
            .values()
            .map(|entry| &entry.listing)
            .filter(|listing| listing.has_availability())
            .filter(|listing| filter.map_or(true, |filter| filter.matches(listing)))
            .cloned()
            .collect()
    }

    /// The only general-purpose count mutator.
    pub fn adjust_counts(
        &self,
        id: &PropertyId,
        delta: CountDelta,
    ) -> Result<PropertyListing, AllocationError> {
        let mut listings = self.write();
        let entry = entry_mut(&mut listings, id)?;

        let updated = apply_delta(&entry.listing, delta)?;
        entry.listing = updated.clone();
        Ok(updated)
    }

    /// Moves finished units from under-construction into the available pool.
    pub fn complete_construction(
        &self,
        id: &PropertyId,
        units: u32,
    ) -> Result<PropertyListing, AllocationError> {
        let updated = self.adjust_counts(id, CountDelta::construction_complete(units))?;
        info!(
            property_id = %id,
            units,
            available_units = updated.available_units,
            "construction units released"
        );
        Ok(updated)
    }

    /// Takes one unit out of the available pool and numbers it.
    ///
    /// The availability check, the decrement and the unit number share one
    /// write guard, so two callers racing for the last unit cannot both
    /// succeed and no number is issued twice.
    pub(crate) fn allocate_unit(&self, id: &PropertyId) -> Result<AllocatedUnit, AllocationError> {
        let mut listings = self.write();
        let entry = entry_mut(&mut listings, id)?;

        if !entry.listing.has_availability() {
            return Err(AllocationError::InsufficientInventory {
                property_id: id.clone(),
            });
        }

        let updated = apply_delta(&entry.listing, CountDelta::allocate_one())?;
        let unit_number = entry.next_unit;
        entry.next_unit = unit_number.saturating_add(1);
        entry.listing = updated.clone();
        Ok(AllocatedUnit {
            listing: updated,
            unit_number,
        })
    }

    /// Program-wide totals for the dashboard counters.
    pub fn summary(&self) -> InventorySummary {
        self.read()
            .values()
            .map(|entry| &entry.listing)
            .fold(InventorySummary::default(), |mut summary, listing| {
                summary.listings += 1;
                summary.total_units += u64::from(listing.total_units);
                summary.available_units += u64::from(listing.available_units);
                summary.allocated_units += u64::from(listing.allocated_units);
                summary.under_construction_units += u64::from(listing.under_construction_units);
                summary.allocated_value = summary.allocated_value.saturating_add(
                    listing
                        .unit_value
                        .saturating_mul(u64::from(listing.allocated_units)),
                );
                summary
            })
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.listings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.listings.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn entry_mut<'a>(listings: &'a mut Entries, id: &PropertyId) -> Result<&'a mut Entry, AllocationError> {
    listings
        .get_mut(id)
        .ok_or_else(|| AllocationError::PropertyNotFound(id.clone()))
}

fn validate_registration(listing: &PropertyListing) -> Result<(), AllocationError> {
    if listing.id.0.trim().is_empty() {
        return Err(ValidationError::MissingPropertyId.into());
    }
    if listing.location.trim().is_empty() {
        return Err(ValidationError::MissingLocation.into());
    }
    if listing.unit_value == 0 {
        return Err(ValidationError::NonPositiveUnitValue.into());
    }
    if !listing.is_balanced() {
        return Err(violation(
            &listing.id,
            format!(
                "{} units accounted for but total is {}",
                listing.accounted_units(),
                listing.total_units
            ),
        ));
    }
    Ok(())
}

/// Returns the listing with `delta` applied, or the reason it cannot be.
pub(crate) fn apply_delta(
    listing: &PropertyListing,
    delta: CountDelta,
) -> Result<PropertyListing, AllocationError> {
    if delta.net() != 0 {
        return Err(violation(
            &listing.id,
            format!("adjustment would change total units by {}", delta.net()),
        ));
    }

    let available = shift(&listing.id, "available", listing.available_units, delta.available)?;
    let allocated = shift(&listing.id, "allocated", listing.allocated_units, delta.allocated)?;
    let under_construction = shift(
        &listing.id,
        "under-construction",
        listing.under_construction_units,
        delta.under_construction,
    )?;

    let updated = PropertyListing {
        available_units: available,
        allocated_units: allocated,
        under_construction_units: under_construction,
        ..listing.clone()
    };

    if !updated.is_balanced() {
        return Err(violation(
            &listing.id,
            format!(
                "{} units accounted for but total is {}",
                updated.accounted_units(),
                updated.total_units
            ),
        ));
    }

    Ok(updated)
}

fn shift(id: &PropertyId, bucket: &str, current: u32, delta: i64) -> Result<u32, AllocationError> {
    let next = i64::from(current).saturating_add(delta);
    if next < 0 {
        return Err(violation(
            id,
            format!("{bucket} units would become {next}"),
        ));
    }
    u32::try_from(next).map_err(|_| violation(id, format!("{bucket} units would overflow")))
}

fn violation(id: &PropertyId, detail: String) -> AllocationError {
    error!(property_id = %id, %detail, "inventory invariant violation rejected");
    AllocationError::InvariantViolation {
        property_id: id.clone(),
        detail,
    }
}
