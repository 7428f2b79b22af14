//! Property allocation: request intake, match scoring, inventory bookkeeping
//! and the allocation history for the housing program.

pub mod domain;
pub mod engine;
pub mod error;
pub mod history;
pub(crate) mod intake;
pub mod inventory;
pub mod lifecycle;
pub mod queue;
pub mod router;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use domain::{
    AllocationId, AllocationRecord, AllocationRequest, CountDelta, CustomerId, HistoryFilter,
    InventorySummary, ListingFilter, Priority, PropertyId, PropertyListing, PropertyType,
    RequestFilter, RequestId, RequestStatus, RequestSubmission,
};
pub use engine::AllocationEngine;
pub use error::{AllocationError, ValidationError};
pub use history::AllocationHistory;
pub use inventory::{InventoryStore, ListingImportError, ListingImporter};
pub use lifecycle::{Transition, TransitionError};
pub use queue::RequestQueue;
pub use router::{allocation_router, status_for};
pub use scoring::{
    MatchBreakdown, MatchCandidate, MatchFactor, MatchScorer, MatchWeights, ScoreComponent,
};
