#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types and query parameter definitions.
//!
//! These types represent the shapes of data as stored in and retrieved from
//! the Postgres database. They are distinct from the API response types in
//! `hardhat_server_models` and from the pre-aggregated ranking inputs in
//! `hardhat_hub_models`.

use chrono::{DateTime, NaiveDate, Utc};
use hardhat_hub_models::{RoomType, Shift};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default cap on listings returned for a move plan.
pub const DEFAULT_LISTING_LIMIT: u32 = 50;

/// How a caller identifies a job site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobsiteRef {
    /// Primary key.
    Id(String),
    /// URL slug (e.g. `"taylor-fab"`).
    Slug(String),
}

impl std::fmt::Display for JobsiteRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Slug(slug) => write!(f, "slug {slug}"),
        }
    }
}

/// A job site row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsiteRow {
    /// Primary key.
    pub id: String,
    /// URL slug, unique.
    pub slug: String,
    /// Display name (e.g. "Samsung Taylor Fab").
    pub name: String,
    /// Employer or general contractor.
    pub employer: Option<String>,
    /// City.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// Short description of the project.
    pub description: Option<String>,
}

/// A hub row: a locality with a commute band to its job site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubRow {
    /// Primary key.
    pub id: String,
    /// Owning job site.
    pub jobsite_id: String,
    /// Town or neighborhood name.
    pub name: String,
    /// Best-case commute in minutes.
    pub commute_min: i32,
    /// Worst-case commute in minutes.
    pub commute_max: i32,
}

/// Publication state of a listing.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ListingStatus {
    /// Visible and accepting introductions.
    #[default]
    Active,
    /// Temporarily hidden by the host.
    Paused,
    /// Room has been taken.
    Filled,
}

/// A room listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
    /// Primary key.
    pub id: String,
    /// Hub the listing is near.
    pub hub_id: String,
    /// Short title.
    pub title: String,
    /// Kind of room offered.
    pub room_type: RoomType,
    /// Lowest monthly rent, dollars.
    pub rent_min: f64,
    /// Highest monthly rent, dollars.
    pub rent_max: f64,
    /// First date the room can be moved into.
    pub available_from: Option<NaiveDate>,
    /// Shift the host prefers; `None` means no preference.
    pub shift: Option<Shift>,
    /// Publication state.
    pub status: ListingStatus,
    /// When the listing was posted.
    pub created_at: DateTime<Utc>,
}

/// Parameters for querying listings from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Only listings near these hubs. An empty list matches nothing.
    pub hub_ids: Vec<String>,
    /// Lower end of the monthly budget.
    pub budget_min: Option<f64>,
    /// Upper end of the monthly budget.
    pub budget_max: Option<f64>,
    /// Only this room type.
    pub room_type: Option<RoomType>,
    /// Only hosts accommodating this shift (or any shift).
    pub shift: Option<Shift>,
    /// Only rooms available on or before this date.
    pub move_in_date: Option<NaiveDate>,
    /// Maximum number of results to return.
    pub limit: u32,
}

impl ListingQuery {
    /// Creates an unfiltered query over the given hubs.
    #[must_use]
    pub const fn for_hubs(hub_ids: Vec<String>) -> Self {
        Self {
            hub_ids,
            budget_min: None,
            budget_max: None,
            room_type: None,
            shift: None,
            move_in_date: None,
            limit: DEFAULT_LISTING_LIMIT,
        }
    }

    /// Returns `true` if `listing` satisfies every filter except `limit`.
    ///
    /// Mirrors the SQL `WHERE` clause so in-memory stores filter the same
    /// way as the database.
    #[must_use]
    pub fn matches(&self, listing: &ListingRow) -> bool {
        listing.status == ListingStatus::Active
            && self.hub_ids.iter().any(|id| *id == listing.hub_id)
            && self.budget_max.is_none_or(|max| listing.rent_min <= max)
            && self.budget_min.is_none_or(|min| listing.rent_max >= min)
            && self.room_type.is_none_or(|rt| listing.room_type == rt)
            && self.shift.is_none_or(|shift| {
                listing
                    .shift
                    .is_none_or(|s| s == shift || s == Shift::Any)
            })
            && self.move_in_date.is_none_or(|date| {
                listing.available_from.is_none_or(|from| from <= date)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> ListingRow {
        ListingRow {
            id: "l1".to_string(),
            hub_id: "h1".to_string(),
            title: "Quiet room near the fab".to_string(),
            room_type: RoomType::PrivateRoom,
            rent_min: 800.0,
            rent_max: 950.0,
            available_from: NaiveDate::from_ymd_opt(2026, 3, 1),
            shift: Some(Shift::Night),
            status: ListingStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unfiltered_query_matches_listed_hubs_only() {
        let q = ListingQuery::for_hubs(vec!["h1".to_string()]);
        assert!(q.matches(&listing()));
        assert!(!ListingQuery::for_hubs(vec!["h2".to_string()]).matches(&listing()));
        assert!(!ListingQuery::for_hubs(Vec::new()).matches(&listing()));
    }

    #[test]
    fn budget_filter_uses_range_overlap() {
        let mut q = ListingQuery::for_hubs(vec!["h1".to_string()]);
        q.budget_min = Some(900.0);
        q.budget_max = Some(1200.0);
        assert!(q.matches(&listing()));
        q.budget_max = Some(700.0);
        assert!(!q.matches(&listing()));
        q.budget_max = None;
        q.budget_min = Some(1000.0);
        assert!(!q.matches(&listing()));
    }

    #[test]
    fn shift_filter_accepts_any_and_unset() {
        let mut q = ListingQuery::for_hubs(vec!["h1".to_string()]);
        q.shift = Some(Shift::Day);
        let mut l = listing();
        assert!(!q.matches(&l));
        l.shift = Some(Shift::Any);
        assert!(q.matches(&l));
        l.shift = None;
        assert!(q.matches(&l));
    }

    #[test]
    fn move_in_date_requires_availability() {
        let mut q = ListingQuery::for_hubs(vec!["h1".to_string()]);
        q.move_in_date = NaiveDate::from_ymd_opt(2026, 2, 15);
        assert!(!q.matches(&listing()));
        q.move_in_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        assert!(q.matches(&listing()));
    }

    #[test]
    fn inactive_listings_never_match() {
        let mut l = listing();
        l.status = ListingStatus::Filled;
        assert!(!ListingQuery::for_hubs(vec!["h1".to_string()]).matches(&l));
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!("paused".parse::<ListingStatus>().ok(), Some(ListingStatus::Paused));
        assert_eq!(ListingStatus::Filled.as_ref(), "filled");
    }
}
