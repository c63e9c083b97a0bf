#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hub ranking and housing scarcity scoring for job sites.
//!
//! [`rank_hubs`] drops hubs whose commute band exceeds the user's ceiling,
//! scores the rest from four independent sub-scores (inventory, budget
//! fit, commute, host response time) and sorts them best first.
//! [`scarcity::classify_scarcity`] derives the job-site level scarcity
//! flag.
//!
//! Everything here is a pure function over in-memory data. Missing optional
//! metrics never exclude a hub; they resolve to a neutral number of points.

pub mod scarcity;
pub mod weights;

use std::cmp::Ordering;

use hardhat_hub_models::{FilterCriteria, HubMetrics, RankedHub, ScoreBreakdown, SubScore};

pub use scarcity::{SCARCITY_LISTING_THRESHOLD, classify_scarcity};
pub use weights::{DEFAULT_WEIGHTS, ScoringWeights};

use crate::weights::tier_points;

/// Number of top-ranked hubs whose listings are pulled for a move plan.
pub const TOP_HUB_COUNT: usize = 5;

/// Outcome of the budget comparison for a single hub.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetFit {
    /// Budget points, or [`SubScore::NoData`] when either side is missing.
    pub score: SubScore,
    /// Whether the hub's rent is within tolerance of the user's budget.
    pub matched: bool,
}

/// Ranks hubs with the production [`ScoringWeights`].
#[must_use]
pub fn rank_hubs(hubs: Vec<HubMetrics>, filters: &FilterCriteria) -> Vec<RankedHub> {
    rank_hubs_with(hubs, filters, &DEFAULT_WEIGHTS)
}

/// Ranks hubs: filters by commute ceiling, scores, and sorts descending.
///
/// A non-positive ceiling yields no hubs. Equal scores are ordered by hub
/// name, then hub id, so the output is deterministic.
#[must_use]
pub fn rank_hubs_with(
    hubs: Vec<HubMetrics>,
    filters: &FilterCriteria,
    weights: &ScoringWeights,
) -> Vec<RankedHub> {
    if filters.commute_max <= 0 {
        log::debug!(
            "Commute ceiling {} is not positive, no hubs eligible",
            filters.commute_max
        );
        return Vec::new();
    }

    let total = hubs.len();
    let mut ranked: Vec<RankedHub> = hubs
        .into_iter()
        .filter(|hub| hub.fits_commute(filters.commute_max))
        .map(|hub| score_hub(hub, filters, weights))
        .collect();

    log::debug!(
        "{} of {total} hubs fit a {} minute commute ceiling",
        ranked.len(),
        filters.commute_max
    );

    sort_ranked(&mut ranked);
    ranked
}

/// Scores a single hub without applying the commute filter.
#[must_use]
pub fn score_hub(hub: HubMetrics, filters: &FilterCriteria, weights: &ScoringWeights) -> RankedHub {
    let budget = budget_fit(&hub, filters, weights);
    let breakdown = ScoreBreakdown {
        inventory: inventory_points(hub.listing_count_30d, weights),
        budget: budget.score.resolve(weights.budget_neutral),
        commute: commute_points(hub.commute_min, weights),
        response: response_fit(hub.median_response_hours, weights)
            .resolve(weights.response_neutral),
    };
    let score = breakdown.total();

    log::trace!(
        "Hub {} ({}): score={score:.2} {breakdown:?}",
        hub.hub_name,
        hub.hub_id
    );

    RankedHub {
        hub,
        score,
        budget_match: budget.matched,
        breakdown,
    }
}

/// Sorts ranked hubs by score descending, breaking ties by name then id.
pub fn sort_ranked(ranked: &mut [RankedHub]) {
    ranked.sort_by(compare_ranked);
}

fn compare_ranked(a: &RankedHub, b: &RankedHub) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.hub.hub_name.cmp(&b.hub.hub_name))
        .then_with(|| a.hub.hub_id.cmp(&b.hub.hub_id))
}

/// Inventory points: linear in 30-day listing volume, capped.
#[must_use]
pub fn inventory_points(listing_count_30d: u32, weights: &ScoringWeights) -> f64 {
    (f64::from(listing_count_30d) * weights.points_per_listing).min(weights.inventory_cap)
}

/// Compares the hub's median rent midpoint against the user's mid-budget.
///
/// Only scored when the user gave both budget ends and the hub has a
/// `median_rent_min`. A missing `median_rent_max` counts as `0` in the
/// hub midpoint.
#[must_use]
pub fn budget_fit(hub: &HubMetrics, filters: &FilterCriteria, weights: &ScoringWeights) -> BudgetFit {
    let (Some(user_mid), Some(rent_min)) = (filters.budget_midpoint(), hub.median_rent_min) else {
        return BudgetFit {
            score: SubScore::NoData,
            matched: true,
        };
    };

    let hub_mid = (rent_min + hub.median_rent_max.unwrap_or(0.0)) / 2.0;
    let diff = (hub_mid - user_mid).abs();

    BudgetFit {
        score: SubScore::Scored(tier_points(weights.budget_tiers, diff)),
        matched: diff <= weights.budget_match_tolerance,
    }
}

/// Commute points from the lower bound of the band, floored at zero.
#[must_use]
pub fn commute_points(commute_min: i32, weights: &ScoringWeights) -> f64 {
    (weights.commute_max_points - f64::from(commute_min) / weights.commute_minutes_per_point)
        .max(0.0)
}

/// Tiered points for the median host response time.
#[must_use]
pub fn response_fit(median_response_hours: Option<f64>, weights: &ScoringWeights) -> SubScore {
    median_response_hours.map_or(SubScore::NoData, |hours| {
        SubScore::Scored(tier_points(weights.response_tiers, hours))
    })
}

/// Returns the ids of the first `n` ranked hubs.
#[must_use]
pub fn top_hub_ids(ranked: &[RankedHub], n: usize) -> Vec<String> {
    ranked.iter().take(n).map(|r| r.hub.hub_id.clone()).collect()
}
