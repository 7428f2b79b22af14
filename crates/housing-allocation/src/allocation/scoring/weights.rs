use serde::{Deserialize, Serialize};

/// Relative importance of each matching factor. Weights sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub property_type: f64,
    pub budget: f64,
    pub location: f64,
    /// Overrun (as a fraction of budget) at which the budget factor reaches zero.
    pub budget_tolerance: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            property_type: 0.40,
            budget: 0.35,
            location: 0.25,
            budget_tolerance: 0.5,
        }
    }
}
