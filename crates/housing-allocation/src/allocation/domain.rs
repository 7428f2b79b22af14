use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Identifier wrapper for registered property listings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

/// Identifier wrapper for customer housing requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

/// Identifier wrapper for confirmed allocations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationId(pub String);

/// Customer identity as supplied by customer management.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

macro_rules! display_id {
    ($($name:ident),+) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        )+
    };
}

display_id!(PropertyId, RequestId, AllocationId, CustomerId);

/// Housing categories offered under the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    Duplex,
    Bungalow,
    Terrace,
    Mansion,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::Apartment,
        PropertyType::Duplex,
        PropertyType::Bungalow,
        PropertyType::Terrace,
        PropertyType::Mansion,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::Duplex => "duplex",
            PropertyType::Bungalow => "bungalow",
            PropertyType::Terrace => "terrace",
            PropertyType::Mansion => "mansion",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PropertyType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingPropertyType);
        }

        PropertyType::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownPropertyType(trimmed.to_string()))
    }
}

/// Request urgency. Variant order gives `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Lifecycle of an allocation request. Transitions live in `lifecycle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A registered property with its unit breakdown.
///
/// `available_units + allocated_units + under_construction_units` always
/// equals `total_units` for listings held by the inventory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyListing {
    pub id: PropertyId,
    pub name: String,
    pub property_type: PropertyType,
    pub location: String,
    pub unit_value: u64,
    pub total_units: u32,
    pub available_units: u32,
    pub allocated_units: u32,
    pub under_construction_units: u32,
}

impl PropertyListing {
    /// Sum of the three status buckets, widened so corrupt input cannot overflow.
    pub fn accounted_units(&self) -> u64 {
        u64::from(self.available_units)
            + u64::from(self.allocated_units)
            + u64::from(self.under_construction_units)
    }

    pub fn is_balanced(&self) -> bool {
        self.accounted_units() == u64::from(self.total_units)
    }

    pub fn has_availability(&self) -> bool {
        self.available_units > 0
    }

    /// Region-level comparison used by matching and filtering.
    pub fn located_in(&self, location: &str) -> bool {
        same_location(&self.location, location)
    }
}

fn same_location(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

/// Raw housing request as captured from the customer-facing intake form.
///
/// Fields are loosely typed on purpose; `RequestGuard` turns them into an
/// `AllocationRequest` or a `ValidationError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSubmission {
    pub customer_id: String,
    pub requested_property_type: String,
    pub budget: i64,
    pub location: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub request_date: Option<NaiveDate>,
}

/// A customer's housing need tracked by the request queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub id: RequestId,
    pub customer_id: CustomerId,
    pub requested_property_type: PropertyType,
    pub budget: u64,
    pub location: String,
    pub priority: Priority,
    pub status: RequestStatus,
    pub request_date: NaiveDate,
}

/// Confirmed assignment of one unit to one request. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub id: AllocationId,
    pub request_id: RequestId,
    pub customer_id: CustomerId,
    pub property_id: PropertyId,
    pub unit_id: String,
    pub allocation_date: NaiveDate,
    pub value: u64,
}

/// Signed change applied to a listing's status buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountDelta {
    #[serde(default)]
    pub available: i64,
    #[serde(default)]
    pub allocated: i64,
    #[serde(default)]
    pub under_construction: i64,
}

impl CountDelta {
    pub const fn allocate_one() -> Self {
        Self {
            available: -1,
            allocated: 1,
            under_construction: 0,
        }
    }

    pub const fn construction_complete(units: u32) -> Self {
        Self {
            available: units as i64,
            allocated: 0,
            under_construction: -(units as i64),
        }
    }

    pub const fn net(&self) -> i64 {
        self.available
            .saturating_add(self.allocated)
            .saturating_add(self.under_construction)
    }
}

/// Optional narrowing for inventory listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_unit_value: Option<u64>,
    #[serde(default)]
    pub available_only: bool,
}

impl ListingFilter {
    pub fn matches(&self, listing: &PropertyListing) -> bool {
        if self.available_only && !listing.has_availability() {
            return false;
        }
        if let Some(kind) = self.property_type {
            if listing.property_type != kind {
                return false;
            }
        }
        if let Some(location) = self.location.as_deref() {
            if !listing.located_in(location) {
                return false;
            }
        }
        if let Some(ceiling) = self.max_unit_value {
            if listing.unit_value > ceiling {
                return false;
            }
        }
        true
    }
}

/// Optional narrowing for allocation history queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub property_id: Option<PropertyId>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &AllocationRecord) -> bool {
        self.customer_id
            .as_ref()
            .map_or(true, |customer| &record.customer_id == customer)
            && self
                .property_id
                .as_ref()
                .map_or(true, |property| &record.property_id == property)
    }
}

/// Optional narrowing for request queue queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

impl RequestFilter {
    pub fn matches(&self, request: &AllocationRequest) -> bool {
        self.status.map_or(true, |status| request.status == status)
            && self
                .customer_id
                .as_ref()
                .map_or(true, |customer| &request.customer_id == customer)
    }
}

/// Program-wide inventory counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub listings: usize,
    pub total_units: u64,
    pub available_units: u64,
    pub allocated_units: u64,
    pub under_construction_units: u64,
    pub allocated_value: u64,
}
