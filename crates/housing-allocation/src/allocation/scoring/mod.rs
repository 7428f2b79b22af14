mod factors;
mod weights;

pub use weights::MatchWeights;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{AllocationRequest, PropertyListing};

/// Criteria contributing to a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    PropertyType,
    Budget,
    Location,
}

/// One factor's contribution, kept so a ranking can be explained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: MatchFactor,
    /// Factor score normalized to [0, 100] before weighting.
    pub score: f64,
    pub weight: f64,
    pub notes: String,
}

/// Composite score with its factor trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub total: u8,
    pub components: Vec<ScoreComponent>,
}

impl MatchBreakdown {
    pub fn component(&self, factor: MatchFactor) -> Option<&ScoreComponent> {
        self.components
            .iter()
            .find(|component| component.factor == factor)
    }
}

/// A listing proposed for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub listing: PropertyListing,
    pub score: u8,
    pub components: Vec<ScoreComponent>,
}

/// Stateless, deterministic scorer.
#[derive(Debug, Clone, Default)]
pub struct MatchScorer {
    weights: MatchWeights,
}

impl MatchScorer {
    /// Compatibility in [0, 100]. Does not consider availability; see `candidate`.
    pub fn score(&self, request: &AllocationRequest, listing: &PropertyListing) -> u8 {
        self.breakdown(request, listing).total
    }

    pub fn breakdown(&self, request: &AllocationRequest, listing: &PropertyListing) -> MatchBreakdown {
        let components = factors::score_factors(request, listing, &self.weights);
        let weighted: f64 = components
            .iter()
            .map(|component| component.score * component.weight)
            .sum();

        MatchBreakdown {
            total: weighted.round().clamp(0.0, 100.0) as u8,
            components,
        }
    }

    /// Scores the listing only if it still has a unit to give.
    pub fn candidate(
        &self,
        request: &AllocationRequest,
        listing: &PropertyListing,
    ) -> Option<MatchCandidate> {
        if !listing.has_availability() {
            return None;
        }

        let MatchBreakdown { total, components } = self.breakdown(request, listing);
        Some(MatchCandidate {
            listing: listing.clone(),
            score: total,
            components,
        })
    }

    /// Scores every available listing and returns them best first.
    pub fn rank<'a, I>(&self, request: &AllocationRequest, listings: I) -> Vec<MatchCandidate>
    where
        I: IntoIterator<Item = &'a PropertyListing>,
    {
        let mut candidates: Vec<MatchCandidate> = listings
            .into_iter()
            .filter_map(|listing| self.candidate(request, listing))
            .collect();
        candidates.sort_by(candidate_order);
        candidates
    }
}

/// Score descending, then more available units, then listing id ascending.
fn candidate_order(left: &MatchCandidate, right: &MatchCandidate) -> Ordering {
    right
        .score
        .cmp(&left.score)
        .then_with(|| {
            right
                .listing
                .available_units
                .cmp(&left.listing.available_units)
        })
        .then_with(|| left.listing.id.cmp(&right.listing.id))
}
