use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use super::domain::{
    AllocationId, AllocationRecord, AllocationRequest, CountDelta, HistoryFilter,
    InventorySummary, ListingFilter, PropertyId, PropertyListing, RequestFilter, RequestId,
    RequestStatus, RequestSubmission,
};
use super::error::AllocationError;
use super::history::AllocationHistory;
use super::intake::RequestGuard;
use super::inventory::InventoryStore;
use super::queue::RequestQueue;
use super::scoring::{MatchCandidate, MatchScorer};

/// Orchestrates intake, matching and confirmation over the shared stores.
///
/// The engine is the only writer to the queue, the inventory counts and the
/// history log. Request-state writers hold `commit` for their whole critical
/// section, so a confirmation's three effects land together or not at all.
#[derive(Debug)]
pub struct AllocationEngine {
    guard: RequestGuard,
    scorer: MatchScorer,
    inventory: InventoryStore,
    queue: RequestQueue,
    history: AllocationHistory,
    commit: Mutex<()>,
    request_sequence: AtomicU64,
    allocation_sequence: AtomicU64,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(InventoryStore::new())
    }
}

impl AllocationEngine {
    pub fn new(inventory: InventoryStore) -> Self {
        Self {
            guard: RequestGuard::new(),
            scorer: MatchScorer::default(),
            inventory,
            queue: RequestQueue::new(),
            history: AllocationHistory::new(),
            commit: Mutex::new(()),
            request_sequence: AtomicU64::new(1),
            allocation_sequence: AtomicU64::new(1),
        }
    }

    pub fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    /// Validates a submission and queues it as `pending`.
    pub fn submit_request(
        &self,
        submission: RequestSubmission,
    ) -> Result<AllocationRequest, AllocationError> {
        let id = self.next_request_id();
        let request =
            self.guard
                .request_from_submission(id, submission, Local::now().date_naive())?;

        let stored = self.queue.insert(request);
        info!(
            request_id = %stored.id,
            customer_id = %stored.customer_id,
            property_type = %stored.requested_property_type,
            priority = stored.priority.label(),
            "allocation request submitted"
        );
        Ok(stored)
    }

    pub fn get_request(&self, request_id: &RequestId) -> Result<AllocationRequest, AllocationError> {
        self.queue.get(request_id)
    }

    /// Ranks every listing with availability against the request. Read-only.
    pub fn find_matches(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<MatchCandidate>, AllocationError> {
        let request = self.queue.get(request_id)?;
        request
            .status
            .ensure_matchable()
            .map_err(|err| AllocationError::InvalidState {
                request_id: request_id.clone(),
                status: err.from,
                action: err.attempted,
            })?;

        let listings = self.inventory.list_available(None);
        let candidates = self.scorer.rank(&request, &listings);
        debug!(
            request_id = %request_id,
            candidates = candidates.len(),
            top_score = candidates.first().map(|candidate| candidate.score),
            "matches ranked"
        );
        Ok(candidates)
    }

    pub fn begin_progress(
        &self,
        request_id: &RequestId,
    ) -> Result<AllocationRequest, AllocationError> {
        let _commit = self.lock_commit();
        let request = self.queue.transition(request_id, RequestStatus::begin)?;
        info!(request_id = %request_id, "allocation request in progress");
        Ok(request)
    }

    /// Allocates one unit of `property_id` to the request, dated today.
    pub fn confirm_allocation(
        &self,
        request_id: &RequestId,
        property_id: &PropertyId,
    ) -> Result<AllocationRecord, AllocationError> {
        self.confirm_allocation_on(request_id, property_id, Local::now().date_naive())
    }

    /// Allocates one unit of `property_id` to the request.
    ///
    /// Availability is re-checked under the inventory write lock even if
    /// `find_matches` reported units earlier.
    pub fn confirm_allocation_on(
        &self,
        request_id: &RequestId,
        property_id: &PropertyId,
        allocation_date: NaiveDate,
    ) -> Result<AllocationRecord, AllocationError> {
        let _commit = self.lock_commit();

        let request = self.queue.get(request_id)?;
        request
            .status
            .complete()
            .map_err(|err| AllocationError::InvalidState {
                request_id: request_id.clone(),
                status: err.from,
                action: err.attempted,
            })?;

        let unit = match self.inventory.allocate_unit(property_id) {
            Ok(unit) => unit,
            Err(err @ AllocationError::InsufficientInventory { .. }) => {
                warn!(
                    request_id = %request_id,
                    property_id = %property_id,
                    "allocation lost: no units left"
                );
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        if let Err(err) = self.queue.transition(request_id, RequestStatus::complete) {
            // Unreachable while `commit` is held; undo the unit transfer regardless.
            // The unit number stays consumed.
            self.inventory.adjust_counts(
                property_id,
                CountDelta {
                    available: 1,
                    allocated: -1,
                    under_construction: 0,
                },
            )?;
            return Err(err);
        }

        let listing = unit.listing;
        let record = AllocationRecord {
            id: self.next_allocation_id(),
            request_id: request.id.clone(),
            customer_id: request.customer_id.clone(),
            property_id: listing.id.clone(),
            unit_id: format!("{}-U{:04}", listing.id, unit.unit_number),
            allocation_date,
            value: listing.unit_value,
        };
        self.history.append(record.clone());

        info!(
            request_id = %request_id,
            property_id = %property_id,
            allocation_id = %record.id,
            unit_id = %record.unit_id,
            value = record.value,
            available_units = listing.available_units,
            "allocation confirmed"
        );
        Ok(record)
    }

    pub fn cancel(&self, request_id: &RequestId) -> Result<AllocationRequest, AllocationError> {
        let _commit = self.lock_commit();
        let request = self.queue.transition(request_id, RequestStatus::cancel)?;
        info!(request_id = %request_id, "allocation request cancelled");
        Ok(request)
    }

    pub fn list_pending_requests(&self) -> Vec<AllocationRequest> {
        self.queue.pending()
    }

    pub fn list_requests(&self, filter: &RequestFilter) -> Vec<AllocationRequest> {
        self.queue.list(filter)
    }

    pub fn list_listings(&self, filter: Option<&ListingFilter>) -> Vec<PropertyListing> {
        match filter {
            Some(filter) => self.inventory.list(filter),
            None => self.inventory.list(&ListingFilter::default()),
        }
    }

    pub fn list_allocation_history(&self, filter: Option<&HistoryFilter>) -> Vec<AllocationRecord> {
        match filter {
            Some(HistoryFilter {
                customer_id: Some(customer_id),
                property_id: None,
            }) => self.history.list_by_customer(customer_id),
            Some(HistoryFilter {
                customer_id: None,
                property_id: Some(property_id),
            }) => self.history.list_by_property(property_id),
            Some(filter) => self.history.list(filter),
            None => self.history.list(&HistoryFilter::default()),
        }
    }

    pub fn register_listing(
        &self,
        listing: PropertyListing,
    ) -> Result<PropertyListing, AllocationError> {
        self.inventory.register(listing)
    }

    pub fn complete_construction(
        &self,
        property_id: &PropertyId,
        units: u32,
    ) -> Result<PropertyListing, AllocationError> {
        self.inventory.complete_construction(property_id, units)
    }

    pub fn inventory_summary(&self) -> InventorySummary {
        self.inventory.summary()
    }

    fn lock_commit(&self) -> std::sync::MutexGuard<'_, ()> {
        self.commit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_request_id(&self) -> RequestId {
        let id = self.request_sequence.fetch_add(1, Ordering::Relaxed);
        RequestId(format!("REQ-{id:06}"))
    }

    fn next_allocation_id(&self) -> AllocationId {
        let id = self.allocation_sequence.fetch_add(1, Ordering::Relaxed);
        AllocationId(format!("ALLOC-{id:06}"))
    }
}
