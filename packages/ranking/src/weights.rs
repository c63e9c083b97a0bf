//! Point weights and tier tables for the hub score.
//!
//! [`ScoringWeights::default()`] reproduces the production heuristic:
//! inventory 0-40, budget fit 0-30, commute 0-20, response time 0-10.

/// A threshold/points pair. A value scores `points` from the first tier
/// whose `limit` it does not exceed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    /// Inclusive upper limit for this tier.
    pub limit: f64,
    /// Points awarded within this tier.
    pub points: f64,
}

impl Tier {
    /// Creates a new tier.
    #[must_use]
    pub const fn new(limit: f64, points: f64) -> Self {
        Self { limit, points }
    }
}

/// Budget tiers keyed on `|hub_mid - user_mid|` in dollars.
pub const BUDGET_TIERS: &[Tier] = &[
    Tier::new(100.0, 30.0),
    Tier::new(200.0, 20.0),
    Tier::new(300.0, 10.0),
];

/// Response tiers keyed on median host response hours.
pub const RESPONSE_TIERS: &[Tier] = &[
    Tier::new(2.0, 10.0),
    Tier::new(6.0, 7.0),
    Tier::new(12.0, 4.0),
    Tier::new(24.0, 2.0),
];

/// Tunable parameters of the hub score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Inventory points per listing in the trailing 30 days.
    pub points_per_listing: f64,
    /// Maximum inventory points.
    pub inventory_cap: f64,
    /// Budget tiers, ordered by ascending `limit`.
    pub budget_tiers: &'static [Tier],
    /// Budget points when the user gave no budget or the hub has no rent data.
    pub budget_neutral: f64,
    /// Largest rent divergence still reported as a budget match.
    pub budget_match_tolerance: f64,
    /// Commute points for a zero-minute lower bound.
    pub commute_max_points: f64,
    /// Commute minutes that cost one point.
    pub commute_minutes_per_point: f64,
    /// Response tiers, ordered by ascending `limit`.
    pub response_tiers: &'static [Tier],
    /// Response points when no response data exists.
    pub response_neutral: f64,
}

/// The production weights.
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    points_per_listing: 4.0,
    inventory_cap: 40.0,
    budget_tiers: BUDGET_TIERS,
    budget_neutral: 15.0,
    budget_match_tolerance: 300.0,
    commute_max_points: 20.0,
    commute_minutes_per_point: 3.0,
    response_tiers: RESPONSE_TIERS,
    response_neutral: 5.0,
};

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl ScoringWeights {
    /// Highest score a hub can reach with these weights.
    #[must_use]
    pub fn max_score(&self) -> f64 {
        self.inventory_cap
            + max_points(self.budget_tiers).max(self.budget_neutral)
            + self.commute_max_points
            + max_points(self.response_tiers).max(self.response_neutral)
    }
}

/// Returns the points of the first tier containing `value`, or `0` when
/// `value` exceeds every tier.
#[must_use]
pub fn tier_points(tiers: &[Tier], value: f64) -> f64 {
    tiers
        .iter()
        .find(|tier| value <= tier.limit)
        .map_or(0.0, |tier| tier.points)
}

fn max_points(tiers: &[Tier]) -> f64 {
    tiers.iter().map(|t| t.points).fold(0.0, f64::max)
}
