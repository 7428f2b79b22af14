use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use super::domain::{AllocationRequest, RequestFilter, RequestId, RequestStatus};
use super::error::AllocationError;
use super::lifecycle::TransitionError;

/// Customer requests keyed by id; each holds exactly one status.
#[derive(Debug, Default)]
pub struct RequestQueue {
    requests: RwLock<BTreeMap<RequestId, AllocationRequest>>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, request: AllocationRequest) -> AllocationRequest {
        let mut requests = self.requests.write().unwrap_or_else(PoisonError::into_inner);
        requests.insert(request.id.clone(), request.clone());
        request
    }

    pub fn get(&self, id: &RequestId) -> Result<AllocationRequest, AllocationError> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| AllocationError::RequestNotFound(id.clone()))
    }

    /// Applies a lifecycle transition in place.
    pub(crate) fn transition<F>(&self, id: &RequestId, step: F) -> Result<AllocationRequest, AllocationError>
    where
        F: FnOnce(RequestStatus) -> Result<RequestStatus, TransitionError>,
    {
        let mut requests = self.requests.write().unwrap_or_else(PoisonError::into_inner);
        let request = requests
            .get_mut(id)
            .ok_or_else(|| AllocationError::RequestNotFound(id.clone()))?;

        request.status = step(request.status).map_err(|err| AllocationError::InvalidState {
            request_id: id.clone(),
            status: err.from,
            action: err.attempted,
        })?;
        Ok(request.clone())
    }

    pub fn list(&self, filter: &RequestFilter) -> Vec<AllocationRequest> {
        self.read()
            .values()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect()
    }

    /// Pending requests, highest priority first, then oldest, then by id.
    pub fn pending(&self) -> Vec<AllocationRequest> {
        let mut pending = self.list(&RequestFilter {
            status: Some(RequestStatus::Pending),
            customer_id: None,
        });
        pending.sort_by(|left, right| {
            right
                .priority
                .cmp(&left.priority)
                .then_with(|| left.request_date.cmp(&right.request_date))
                .then_with(|| left.id.cmp(&right.id))
        });
        pending
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<RequestId, AllocationRequest>> {
        self.requests.read().unwrap_or_else(PoisonError::into_inner)
    }
}
