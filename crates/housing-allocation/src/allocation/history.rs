use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use super::domain::{AllocationId, AllocationRecord, CustomerId, HistoryFilter, PropertyId};

/// Append-only log of confirmed allocations, kept in confirmation order.
#[derive(Debug, Default)]
pub struct AllocationHistory {
    inner: RwLock<HistoryInner>,
}

#[derive(Debug, Default)]
struct HistoryInner {
    records: Vec<AllocationRecord>,
    ids: HashSet<AllocationId>,
}

impl AllocationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when a record with the same id was already logged.
    pub fn append(&self, record: AllocationRecord) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !inner.ids.insert(record.id.clone()) {
            return false;
        }
        inner.records.push(record);
        true
    }

    pub fn list_by_customer(&self, customer_id: &CustomerId) -> Vec<AllocationRecord> {
        self.list(&HistoryFilter {
            customer_id: Some(customer_id.clone()),
            property_id: None,
        })
    }

    pub fn list_by_property(&self, property_id: &PropertyId) -> Vec<AllocationRecord> {
        self.list(&HistoryFilter {
            customer_id: None,
            property_id: Some(property_id.clone()),
        })
    }

    pub fn list(&self, filter: &HistoryFilter) -> Vec<AllocationRecord> {
        self.read()
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, HistoryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}
