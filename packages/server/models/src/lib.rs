#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the hardhat housing server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database row types to allow independent evolution of the API
//! contract. Field names are `snake_case` to match the move-planner
//! payload that clients already consume.

use chrono::{DateTime, NaiveDate, Utc};
use hardhat_database_models::{JobsiteRow, ListingRow};
use hardhat_hub_models::{RankedHub, RoomType, ScarcitySignal, Shift};
use serde::{Deserialize, Serialize};

/// Input for the "Plan My Move" endpoint, from a query string or JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMoveParams {
    /// Job site primary key. Takes precedence over `jobsite_slug`.
    pub jobsite_id: Option<String>,
    /// Job site URL slug.
    pub jobsite_slug: Option<String>,
    /// Lower end of the monthly budget.
    pub budget_min: Option<f64>,
    /// Upper end of the monthly budget.
    pub budget_max: Option<f64>,
    /// Commute ceiling in minutes; the server default applies when omitted.
    pub commute_max: Option<i32>,
    /// Only listings with this room type.
    pub room_type: Option<RoomType>,
    /// Only hosts accommodating this shift.
    pub shift: Option<Shift>,
    /// Desired move-in date (ISO 8601 date).
    pub move_in_date: Option<NaiveDate>,
}

/// Response of the "Plan My Move" endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMoveResponse {
    /// Eligible hubs, best first.
    pub hubs: Vec<RankedHub>,
    /// Listings near the top-ranked hubs.
    pub listings: Vec<ApiListing>,
    /// The resolved job site, or `null` when it could not be resolved.
    pub jobsite: Option<ApiJobsite>,
    /// Job-site level scarcity signal.
    pub scarcity: ScarcitySignal,
}

impl PlanMoveResponse {
    /// Response for a job site that could not be resolved.
    #[must_use]
    pub const fn unresolved() -> Self {
        Self {
            hubs: Vec::new(),
            listings: Vec::new(),
            jobsite: None,
            scarcity: ScarcitySignal::unavailable(),
        }
    }
}

/// A job site as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiJobsite {
    /// Primary key.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Employer or general contractor.
    pub employer: Option<String>,
    /// City.
    pub city: String,
    /// State abbreviation.
    pub state: String,
    /// Short description.
    pub description: Option<String>,
}

impl From<JobsiteRow> for ApiJobsite {
    fn from(row: JobsiteRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            employer: row.employer,
            city: row.city,
            state: row.state,
            description: row.description,
        }
    }
}

/// A room listing as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiListing {
    /// Unique listing ID.
    pub id: String,
    /// Hub the listing is near.
    pub hub_id: String,
    /// Short title.
    pub title: String,
    /// Kind of room.
    pub room_type: RoomType,
    /// Lowest monthly rent.
    pub rent_min: f64,
    /// Highest monthly rent.
    pub rent_max: f64,
    /// First move-in date.
    pub available_from: Option<NaiveDate>,
    /// Shift the host prefers.
    pub shift: Option<Shift>,
    /// When the listing was posted (ISO 8601).
    pub created_at: DateTime<Utc>,
}

impl From<ListingRow> for ApiListing {
    fn from(row: ListingRow) -> Self {
        Self {
            id: row.id,
            hub_id: row.hub_id,
            title: row.title,
            room_type: row.room_type,
            rent_min: row.rent_min,
            rent_max: row.rent_max,
            available_from: row.available_from,
            shift: row.shift,
            created_at: row.created_at,
        }
    }
}

/// Ranked hubs for a job site with default filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsiteHubsResponse {
    /// The job site.
    pub jobsite: ApiJobsite,
    /// Commute ceiling the hubs were filtered with.
    pub commute_max: i32,
    /// Eligible hubs, best first.
    pub hubs: Vec<RankedHub>,
}

/// Query parameters for the job site hubs endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsiteHubsParams {
    /// Commute ceiling in minutes.
    pub commute_max: Option<i32>,
}

/// Error body returned for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_response_serializes_fail_open_shape() {
        let json = serde_json::to_value(PlanMoveResponse::unresolved()).unwrap();
        assert_eq!(json["hubs"], serde_json::json!([]));
        assert_eq!(json["listings"], serde_json::json!([]));
        assert!(json["jobsite"].is_null());
        assert_eq!(json["scarcity"]["listings_14d"], 0);
        assert!(json["scarcity"]["avg_response_hours"].is_null());
        assert_eq!(json["scarcity"]["is_scarce"], true);
    }

    #[test]
    fn params_deserialize_from_partial_json() {
        let params: PlanMoveParams = serde_json::from_value(serde_json::json!({
            "jobsite_slug": "taylor-fab",
            "budget_min": 600,
            "budget_max": 1000,
            "room_type": "private_room",
            "move_in_date": "2026-03-01",
        }))
        .unwrap();
        assert_eq!(params.jobsite_slug.as_deref(), Some("taylor-fab"));
        assert_eq!(params.budget_max, Some(1000.0));
        assert_eq!(params.room_type, Some(RoomType::PrivateRoom));
        assert_eq!(params.commute_max, None);
        assert_eq!(params.move_in_date, NaiveDate::from_ymd_opt(2026, 3, 1));
    }
}
