//! Job-site level housing scarcity signal.

use hardhat_hub_models::{JobsiteMetrics, ScarcitySignal};

/// A job site with fewer active listings than this in the trailing 14 days
/// is scarce.
pub const SCARCITY_LISTING_THRESHOLD: u32 = 5;

/// Classifies a job site's 14-day listing volume.
#[must_use]
pub const fn classify_scarcity(metrics: &JobsiteMetrics) -> ScarcitySignal {
    ScarcitySignal {
        listings_14d: metrics.listings_14d,
        avg_response_hours: metrics.avg_response_hours,
        is_scarce: metrics.listings_14d < SCARCITY_LISTING_THRESHOLD,
    }
}

/// Classifies `metrics`, or returns [`ScarcitySignal::unavailable`] when the
/// job site has no metrics.
#[must_use]
pub fn classify_or_unavailable(metrics: Option<&JobsiteMetrics>) -> ScarcitySignal {
    metrics.map_or_else(ScarcitySignal::unavailable, classify_scarcity)
}
