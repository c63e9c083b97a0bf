#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! "Plan My Move" request flow.
//!
//! Validates the user's criteria, resolves the job site, ranks its hubs,
//! pulls listings near the top-ranked hubs, and attaches the job-site
//! scarcity signal. Data access goes through the [`HousingStore`] trait so
//! the flow runs the same against Postgres or an in-memory fixture.
//!
//! An unresolvable job site is not an error: the response comes back
//! empty with `jobsite: null` and a scarce signal.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use hardhat_database_models::{
    DEFAULT_LISTING_LIMIT, JobsiteRef, JobsiteRow, ListingQuery, ListingRow,
};
use hardhat_hub_models::{FilterCriteria, HubMetrics, JobsiteMetrics, RankedHub, RoomType, Shift};
use hardhat_ranking::scarcity::classify_or_unavailable;
use hardhat_ranking::{TOP_HUB_COUNT, rank_hubs, top_hub_ids};
use hardhat_server_models::{ApiListing, PlanMoveParams, PlanMoveResponse};
use thiserror::Error;

/// Commute ceiling applied when the client doesn't send one.
pub const DEFAULT_COMMUTE_MAX_MINUTES: i32 = 45;

/// Errors raised by a [`HousingStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed (query error, lost connection).
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Errors from planning a move.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The request's criteria are malformed.
    #[error("Invalid criteria: {message}")]
    InvalidCriteria {
        /// Description of what went wrong.
        message: String,
    },

    /// A data access call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn invalid(message: impl Into<String>) -> PlanError {
    PlanError::InvalidCriteria {
        message: message.into(),
    }
}

/// Source of job sites, pre-aggregated metrics, and listings.
#[async_trait]
pub trait HousingStore: Send + Sync {
    /// Returns every job site, ordered by name.
    async fn jobsites(&self) -> Result<Vec<JobsiteRow>, StoreError>;

    /// Looks up a job site by id or slug.
    async fn resolve_jobsite(&self, jobsite: &JobsiteRef)
    -> Result<Option<JobsiteRow>, StoreError>;

    /// Returns the metrics of every hub belonging to the job site.
    async fn hub_metrics(&self, jobsite_id: &str) -> Result<Vec<HubMetrics>, StoreError>;

    /// Returns the job-site level aggregate, if any.
    async fn jobsite_metrics(&self, jobsite_id: &str)
    -> Result<Option<JobsiteMetrics>, StoreError>;

    /// Returns listings matching the query.
    async fn listings(&self, query: &ListingQuery) -> Result<Vec<ListingRow>, StoreError>;
}

/// Validated move criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCriteria {
    /// The job site to plan around.
    pub jobsite: JobsiteRef,
    /// Ranking filters.
    pub filters: FilterCriteria,
    /// Listing filter: room type.
    pub room_type: Option<RoomType>,
    /// Listing filter: shift.
    pub shift: Option<Shift>,
    /// Listing filter: move-in date.
    pub move_in_date: Option<NaiveDate>,
}

impl MoveCriteria {
    /// Builds the listings query for the given hubs.
    #[must_use]
    pub fn listing_query(&self, hub_ids: Vec<String>) -> ListingQuery {
        ListingQuery {
            hub_ids,
            budget_min: self.filters.budget_min,
            budget_max: self.filters.budget_max,
            room_type: self.room_type,
            shift: self.shift,
            move_in_date: self.move_in_date,
            limit: DEFAULT_LISTING_LIMIT,
        }
    }
}

fn check_budget(name: &str, value: Option<f64>) -> Result<(), PlanError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(invalid(format!("{name} must be a non-negative number, got {v}")))
        }
        _ => Ok(()),
    }
}

/// Resolves the job site reference from id or slug. The id wins when both
/// are present; blank values count as absent.
///
/// # Errors
///
/// Returns [`PlanError::InvalidCriteria`] if neither is present.
pub fn jobsite_ref(
    jobsite_id: Option<&str>,
    jobsite_slug: Option<&str>,
) -> Result<JobsiteRef, PlanError> {
    fn non_blank(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }

    if let Some(id) = non_blank(jobsite_id) {
        Ok(JobsiteRef::Id(id.to_string()))
    } else if let Some(slug) = non_blank(jobsite_slug) {
        Ok(JobsiteRef::Slug(slug.to_string()))
    } else {
        Err(invalid("one of jobsite_id or jobsite_slug is required"))
    }
}

/// Validates raw request parameters.
///
/// The ranker itself accepts any input; this is where malformed criteria
/// are turned away before reaching it.
///
/// # Errors
///
/// Returns [`PlanError::InvalidCriteria`] when no job site is given, the
/// commute ceiling is not positive, a budget is negative or not finite, or
/// `budget_min > budget_max`.
pub fn validate(params: &PlanMoveParams) -> Result<MoveCriteria, PlanError> {
    let jobsite = jobsite_ref(params.jobsite_id.as_deref(), params.jobsite_slug.as_deref())?;

    let commute_max = params.commute_max.unwrap_or(DEFAULT_COMMUTE_MAX_MINUTES);
    if commute_max <= 0 {
        return Err(invalid(format!(
            "commute_max must be a positive number of minutes, got {commute_max}"
        )));
    }

    check_budget("budget_min", params.budget_min)?;
    check_budget("budget_max", params.budget_max)?;
    if let (Some(min), Some(max)) = (params.budget_min, params.budget_max)
        && min > max
    {
        return Err(invalid(format!(
            "budget_min ({min}) must not exceed budget_max ({max})"
        )));
    }

    Ok(MoveCriteria {
        jobsite,
        filters: FilterCriteria {
            budget_min: params.budget_min,
            budget_max: params.budget_max,
            commute_max,
        },
        room_type: params.room_type,
        shift: params.shift,
        move_in_date: params.move_in_date,
    })
}

/// Resolves a job site and ranks its hubs.
///
/// Returns `None` when the job site doesn't exist.
///
/// # Errors
///
/// Returns [`PlanError::Store`] if a store call fails.
pub async fn ranked_hubs_for(
    store: &dyn HousingStore,
    jobsite: &JobsiteRef,
    filters: &FilterCriteria,
) -> Result<Option<(JobsiteRow, Vec<RankedHub>)>, PlanError> {
    let Some(row) = store.resolve_jobsite(jobsite).await? else {
        log::debug!("Job site {jobsite} not found");
        return Ok(None);
    };

    let metrics = store.hub_metrics(&row.id).await?;
    let ranked = rank_hubs(metrics, filters);
    Ok(Some((row, ranked)))
}

/// Runs the full move-planning flow for validated criteria.
///
/// # Errors
///
/// Returns [`PlanError::Store`] if a store call fails.
pub async fn plan_with(
    store: &dyn HousingStore,
    criteria: &MoveCriteria,
) -> Result<PlanMoveResponse, PlanError> {
    let Some((jobsite, hubs)) =
        ranked_hubs_for(store, &criteria.jobsite, &criteria.filters).await?
    else {
        log::info!(
            "Job site {} could not be resolved, returning empty plan",
            criteria.jobsite
        );
        return Ok(PlanMoveResponse::unresolved());
    };

    let top = top_hub_ids(&hubs, TOP_HUB_COUNT);
    let listings = if top.is_empty() {
        Vec::new()
    } else {
        store.listings(&criteria.listing_query(top)).await?
    };

    let metrics = store.jobsite_metrics(&jobsite.id).await?;
    let scarcity = classify_or_unavailable(metrics.as_ref());

    log::info!(
        "Planned move for {}: {} hubs, {} listings, scarce={}",
        jobsite.slug,
        hubs.len(),
        listings.len(),
        scarcity.is_scarce
    );

    Ok(PlanMoveResponse {
        hubs,
        listings: listings.into_iter().map(ApiListing::from).collect(),
        jobsite: Some(jobsite.into()),
        scarcity,
    })
}

/// Validates `params` and plans the move.
///
/// # Errors
///
/// Returns [`PlanError::InvalidCriteria`] for malformed input or
/// [`PlanError::Store`] if a store call fails.
pub async fn plan_move(
    store: &dyn HousingStore,
    params: &PlanMoveParams,
) -> Result<PlanMoveResponse, PlanError> {
    let criteria = validate(params)?;
    plan_with(store, &criteria).await
}
