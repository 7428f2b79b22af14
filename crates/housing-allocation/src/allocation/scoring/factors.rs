use super::super::domain::{AllocationRequest, PropertyListing};
use super::weights::MatchWeights;
use super::{MatchFactor, ScoreComponent};

const FULL: f64 = 100.0;

pub(crate) fn score_factors(
    request: &AllocationRequest,
    listing: &PropertyListing,
    weights: &MatchWeights,
) -> Vec<ScoreComponent> {
    vec![
        type_component(request, listing, weights),
        budget_component(request, listing, weights),
        location_component(request, listing, weights),
    ]
}

fn type_component(
    request: &AllocationRequest,
    listing: &PropertyListing,
    weights: &MatchWeights,
) -> ScoreComponent {
    let (score, notes) = if listing.property_type == request.requested_property_type {
        (FULL, format!("{} matches request", listing.property_type))
    } else {
        (
            0.0,
            format!(
                "{} offered, {} requested",
                listing.property_type, request.requested_property_type
            ),
        )
    };

    ScoreComponent {
        factor: MatchFactor::PropertyType,
        score,
        weight: weights.property_type,
        notes,
    }
}

fn budget_component(
    request: &AllocationRequest,
    listing: &PropertyListing,
    weights: &MatchWeights,
) -> ScoreComponent {
    let score = budget_fit(listing.unit_value, request.budget, weights.budget_tolerance);
    let notes = if listing.unit_value <= request.budget {
        format!(
            "unit value {} within budget {}",
            listing.unit_value, request.budget
        )
    } else {
        format!(
            "unit value {} exceeds budget {} by {:.1}%",
            listing.unit_value,
            request.budget,
            overrun(listing.unit_value, request.budget) * 100.0
        )
    };

    ScoreComponent {
        factor: MatchFactor::Budget,
        score,
        weight: weights.budget,
        notes,
    }
}

fn location_component(
    request: &AllocationRequest,
    listing: &PropertyListing,
    weights: &MatchWeights,
) -> ScoreComponent {
    let (score, notes) = if listing.located_in(&request.location) {
        (FULL, format!("located in {}", listing.location.trim()))
    } else {
        (
            0.0,
            format!(
                "located in {}, requested {}",
                listing.location.trim(),
                request.location.trim()
            ),
        )
    };

    ScoreComponent {
        factor: MatchFactor::Location,
        score,
        weight: weights.location,
        notes,
    }
}

/// Full marks at or under budget, falling linearly to zero once the overrun
/// reaches `tolerance` (a fraction of the budget).
pub(crate) fn budget_fit(unit_value: u64, budget: u64, tolerance: f64) -> f64 {
    if unit_value <= budget {
        return FULL;
    }
    if budget == 0 || tolerance <= 0.0 {
        return 0.0;
    }

    let penalty = FULL / tolerance * overrun(unit_value, budget);
    (FULL - penalty).max(0.0)
}

fn overrun(unit_value: u64, budget: u64) -> f64 {
    if budget == 0 {
        return f64::INFINITY;
    }
    unit_value.saturating_sub(budget) as f64 / budget as f64
}
