use chrono::NaiveDate;

use super::domain::{
    AllocationRequest, CustomerId, PropertyType, RequestId, RequestStatus, RequestSubmission,
};
use super::error::ValidationError;

/// Turns raw submissions into queue-ready requests.
#[derive(Debug, Clone, Default)]
pub struct RequestGuard;

impl RequestGuard {
    pub fn new() -> Self {
        Self
    }

    /// Validates `submission` and stamps it as a fresh `pending` request.
    ///
    /// `today` is used when the submission carries no request date.
    pub fn request_from_submission(
        &self,
        id: RequestId,
        submission: RequestSubmission,
        today: NaiveDate,
    ) -> Result<AllocationRequest, ValidationError> {
        let customer_id = submission.customer_id.trim();
        if customer_id.is_empty() {
            return Err(ValidationError::MissingCustomer);
        }

        let requested_property_type: PropertyType = submission.requested_property_type.parse()?;

        let budget = u64::try_from(submission.budget)
            .ok()
            .filter(|budget| *budget > 0)
            .ok_or(ValidationError::NonPositiveBudget(submission.budget))?;

        let location = submission.location.trim();
        if location.is_empty() {
            return Err(ValidationError::MissingLocation);
        }

        Ok(AllocationRequest {
            id,
            customer_id: CustomerId(customer_id.to_string()),
            requested_property_type,
            budget,
            location: location.to_string(),
            priority: submission.priority,
            status: RequestStatus::Pending,
            request_date: submission.request_date.unwrap_or(today),
        })
    }
}
