#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Hub metrics, filter criteria, and ranking result types.
//!
//! A hub is a named locality (town or neighborhood) near a job site with a
//! known commute band. The Metrics Provider hands the ranker one
//! [`HubMetrics`] per hub, already aggregated; the ranker turns them into
//! [`RankedHub`]s. Job-site level aggregates ([`JobsiteMetrics`]) feed the
//! [`ScarcitySignal`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Pre-aggregated metrics for a single hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubMetrics {
    /// Opaque hub identifier.
    pub hub_id: String,
    /// Opaque identifier of the job site this hub belongs to.
    pub jobsite_id: String,
    /// Display label (town or neighborhood name).
    pub hub_name: String,
    /// Best-case commute in minutes (inclusive lower bound).
    pub commute_min: i32,
    /// Worst-case commute in minutes (inclusive upper bound).
    pub commute_max: i32,
    /// Active listings near this hub created in the trailing 30 days.
    pub listing_count_30d: u32,
    /// Active listings near this hub created in the trailing 14 days.
    pub listing_count_14d: u32,
    /// Median of listing minimum rents, dollars/month.
    pub median_rent_min: Option<f64>,
    /// Median of listing maximum rents, dollars/month.
    pub median_rent_max: Option<f64>,
    /// Median hours for hosts near this hub to answer an introduction.
    pub median_response_hours: Option<f64>,
}

impl HubMetrics {
    /// Returns `true` if the whole commute band fits under `ceiling`.
    ///
    /// The upper bound of the band is compared, not the lower bound or the
    /// midpoint.
    #[must_use]
    pub const fn fits_commute(&self, ceiling: i32) -> bool {
        self.commute_max <= ceiling
    }

    /// Returns `true` if the record satisfies the band and window
    /// invariants (`0 <= commute_min <= commute_max` and the 14-day count
    /// not exceeding the 30-day count).
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.commute_min >= 0
            && self.commute_min <= self.commute_max
            && self.listing_count_14d <= self.listing_count_30d
    }
}

/// User filters for a single ranking request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Lower end of the monthly budget.
    pub budget_min: Option<f64>,
    /// Upper end of the monthly budget.
    pub budget_max: Option<f64>,
    /// Hard commute ceiling in minutes.
    pub commute_max: i32,
}

impl FilterCriteria {
    /// Creates criteria with only a commute ceiling and no budget.
    #[must_use]
    pub const fn with_commute_max(commute_max: i32) -> Self {
        Self {
            budget_min: None,
            budget_max: None,
            commute_max,
        }
    }

    /// Returns the budget bounds when both ends are present.
    #[must_use]
    pub const fn budget_range(&self) -> Option<(f64, f64)> {
        match (self.budget_min, self.budget_max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }

    /// Returns the middle of the budget range when both ends are present.
    #[must_use]
    pub fn budget_midpoint(&self) -> Option<f64> {
        self.budget_range().map(|(min, max)| (min + max) / 2.0)
    }
}

/// A sub-score before missing data has been resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubScore {
    /// Points computed from real data.
    Scored(f64),
    /// The input needed for this sub-score was absent.
    NoData,
}

impl SubScore {
    /// Collapses the sub-score to points, using `neutral` for [`Self::NoData`].
    #[must_use]
    pub const fn resolve(self, neutral: f64) -> f64 {
        match self {
            Self::Scored(points) => points,
            Self::NoData => neutral,
        }
    }

    /// Returns `true` if this sub-score was computed without data.
    #[must_use]
    pub const fn is_no_data(self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Points contributed by each of the four sub-scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Inventory points (30-day listing volume).
    pub inventory: f64,
    /// Budget-fit points.
    pub budget: f64,
    /// Commute points (lower bound of the band).
    pub commute: f64,
    /// Host response-time points.
    pub response: f64,
}

impl ScoreBreakdown {
    /// Sum of all sub-scores.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.inventory + self.budget + self.commute + self.response
    }
}

/// A hub that survived the commute filter, with its composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHub {
    /// The hub's metrics, flattened into the JSON object.
    #[serde(flatten)]
    pub hub: HubMetrics,
    /// Composite suitability score, higher is better.
    pub score: f64,
    /// `false` only when the hub's median rent is far from the user's
    /// mid-budget.
    pub budget_match: bool,
    /// Per-sub-score points making up [`Self::score`].
    pub breakdown: ScoreBreakdown,
}

/// Job-site level aggregate used for the scarcity signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsiteMetrics {
    /// Opaque job site identifier.
    pub jobsite_id: String,
    /// Active listings across all hubs in the trailing 14 days.
    pub listings_14d: u32,
    /// Average host response time in hours.
    pub avg_response_hours: Option<f64>,
}

/// Whether housing near a job site is thin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScarcitySignal {
    /// Active listings for the job site in the trailing 14 days.
    pub listings_14d: u32,
    /// Average host response time in hours.
    pub avg_response_hours: Option<f64>,
    /// Whether supply is below the scarcity threshold.
    pub is_scarce: bool,
}

impl ScarcitySignal {
    /// Signal used when no job-site metrics exist. Missing data counts as
    /// scarce.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            listings_14d: 0,
            avg_response_hours: None,
            is_scarce: true,
        }
    }
}

/// Kind of room offered by a listing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RoomType {
    /// A private bedroom in a shared home.
    PrivateRoom,
    /// A shared bedroom.
    SharedRoom,
    /// An entire apartment or house.
    EntireUnit,
    /// An RV or camper pad.
    RvSpot,
}

impl RoomType {
    /// Returns all room types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PrivateRoom,
            Self::SharedRoom,
            Self::EntireUnit,
            Self::RvSpot,
        ]
    }
}

/// Work shift a host is comfortable accommodating.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Shift {
    /// Day shift.
    Day,
    /// Night shift.
    Night,
    /// Swing shift.
    Swing,
    /// Rotating schedule.
    Rotating,
    /// Any schedule.
    Any,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub(commute_min: i32, commute_max: i32) -> HubMetrics {
        HubMetrics {
            hub_id: "h1".to_string(),
            jobsite_id: "j1".to_string(),
            hub_name: "Taylor".to_string(),
            commute_min,
            commute_max,
            listing_count_30d: 3,
            listing_count_14d: 1,
            median_rent_min: None,
            median_rent_max: None,
            median_response_hours: None,
        }
    }

    #[test]
    fn commute_fit_uses_upper_bound() {
        let h = hub(20, 45);
        assert!(!h.fits_commute(30));
        assert!(h.fits_commute(45));
    }

    #[test]
    fn consistency_checks_band_and_windows() {
        assert!(hub(5, 15).is_consistent());
        assert!(!hub(20, 10).is_consistent());
        assert!(!hub(-1, 10).is_consistent());

        let mut h = hub(5, 15);
        h.listing_count_14d = 4;
        assert!(!h.is_consistent());
    }

    #[test]
    fn budget_range_requires_both_ends() {
        let mut f = FilterCriteria::with_commute_max(30);
        assert_eq!(f.budget_range(), None);
        f.budget_min = Some(600.0);
        assert_eq!(f.budget_midpoint(), None);
        f.budget_max = Some(1000.0);
        assert_eq!(f.budget_range(), Some((600.0, 1000.0)));
        assert_eq!(f.budget_midpoint(), Some(800.0));
    }

    #[test]
    fn sub_score_resolves_no_data_to_neutral() {
        assert!((SubScore::NoData.resolve(15.0) - 15.0).abs() < f64::EPSILON);
        assert!((SubScore::Scored(30.0).resolve(15.0) - 30.0).abs() < f64::EPSILON);
        assert!(SubScore::NoData.is_no_data());
    }

    #[test]
    fn unavailable_scarcity_is_scarce() {
        let s = ScarcitySignal::unavailable();
        assert_eq!(s.listings_14d, 0);
        assert!(s.avg_response_hours.is_none());
        assert!(s.is_scarce);
    }

    #[test]
    fn room_type_parses_case_insensitively() {
        assert_eq!("private_room".parse::<RoomType>().ok(), Some(RoomType::PrivateRoom));
        assert_eq!("RV_SPOT".parse::<RoomType>().ok(), Some(RoomType::RvSpot));
        assert!("castle".parse::<RoomType>().is_err());
        assert_eq!(RoomType::EntireUnit.as_ref(), "entire_unit");
    }

    #[test]
    fn ranked_hub_serializes_flat() {
        let ranked = RankedHub {
            hub: hub(5, 15),
            score: 42.0,
            budget_match: true,
            breakdown: ScoreBreakdown::default(),
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["hub_name"], "Taylor");
        assert_eq!(json["commute_max"], 15);
        assert_eq!(json["budget_match"], true);
        assert!(json.get("hub").is_none());
    }
}
