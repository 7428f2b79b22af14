use super::domain::{PropertyId, RequestId, RequestStatus};
use super::lifecycle::Transition;

/// Malformed request or registration input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("budget must be greater than zero (found {0})")]
    NonPositiveBudget(i64),
    #[error("requested property type is required")]
    MissingPropertyType,
    #[error("unknown property type '{0}'")]
    UnknownPropertyType(String),
    #[error("location is required")]
    MissingLocation,
    #[error("customer id is required")]
    MissingCustomer,
    #[error("property id is required")]
    MissingPropertyId,
    #[error("unit value must be greater than zero")]
    NonPositiveUnitValue,
    #[error("property {0} is already registered")]
    DuplicateListing(PropertyId),
}

/// Failure surfaced by the allocation engine and its stores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request {request_id} cannot {} while {status}", .action.verb())]
    InvalidState {
        request_id: RequestId,
        status: RequestStatus,
        action: Transition,
    },
    #[error("property {property_id} has no available units")]
    InsufficientInventory { property_id: PropertyId },
    #[error("inventory invariant violated for property {property_id}: {detail}")]
    InvariantViolation {
        property_id: PropertyId,
        detail: String,
    },
    #[error("request {0} not found")]
    RequestNotFound(RequestId),
    #[error("property {0} not found")]
    PropertyNotFound(PropertyId),
}

impl AllocationError {
    /// Stable machine-readable discriminator for API payloads.
    pub const fn kind(&self) -> &'static str {
        match self {
            AllocationError::Validation(_) => "validation",
            AllocationError::InvalidState { .. } => "invalid_state",
            AllocationError::InsufficientInventory { .. } => "insufficient_inventory",
            AllocationError::InvariantViolation { .. } => "invariant_violation",
            AllocationError::RequestNotFound(_) => "request_not_found",
            AllocationError::PropertyNotFound(_) => "property_not_found",
        }
    }
}
