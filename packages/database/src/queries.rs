//! Database query functions for job sites, hubs, and listings.
//!
//! Read paths feed the move planner: job site lookup, the per-hub and
//! per-job-site metrics views, and the filtered listings query. Write paths
//! are the upserts used by the seed loader.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use hardhat_database_models::{
    HubRow, JobsiteRef, JobsiteRow, ListingQuery, ListingRow, ListingStatus,
};
use hardhat_hub_models::{HubMetrics, JobsiteMetrics, RoomType, Shift};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

const JOBSITE_COLUMNS: &str = "id, slug, name, employer, city, state, description";

fn opt_string(value: Option<&str>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.to_string()))
}

/// Converts a `COUNT(*)` result to `u32`, saturating on overflow and
/// clamping negatives to zero.
fn count_to_u32(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

/// Returns all job sites ordered by name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_jobsites(db: &dyn Database) -> Result<Vec<JobsiteRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {JOBSITE_COLUMNS} FROM jobsites ORDER BY name"),
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| JobsiteRow {
            id: row.to_value("id").unwrap_or_default(),
            slug: row.to_value("slug").unwrap_or_default(),
            name: row.to_value("name").unwrap_or_default(),
            employer: row.to_value("employer").unwrap_or(None),
            city: row.to_value("city").unwrap_or_default(),
            state: row.to_value("state").unwrap_or_default(),
            description: row.to_value("description").unwrap_or(None),
        })
        .collect())
}

/// Looks up a job site by id or slug.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_jobsite(
    db: &dyn Database,
    jobsite: &JobsiteRef,
) -> Result<Option<JobsiteRow>, DbError> {
    let (column, value) = match jobsite {
        JobsiteRef::Id(id) => ("id", id),
        JobsiteRef::Slug(slug) => ("slug", slug),
    };

    let rows = db
        .query_raw_params(
            &format!("SELECT {JOBSITE_COLUMNS} FROM jobsites WHERE {column} = $1 LIMIT 1"),
            &[DatabaseValue::String(value.clone())],
        )
        .await?;

    Ok(rows.first().map(|row| JobsiteRow {
        id: row.to_value("id").unwrap_or_default(),
        slug: row.to_value("slug").unwrap_or_default(),
        name: row.to_value("name").unwrap_or_default(),
        employer: row.to_value("employer").unwrap_or(None),
        city: row.to_value("city").unwrap_or_default(),
        state: row.to_value("state").unwrap_or_default(),
        description: row.to_value("description").unwrap_or(None),
    }))
}

/// Returns the aggregated metrics for every hub of a job site.
///
/// Records that violate the commute band or window invariants are logged
/// and still returned; the ranker degrades gracefully on them.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn hub_metrics_for_jobsite(
    db: &dyn Database,
    jobsite_id: &str,
) -> Result<Vec<HubMetrics>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT hub_id, jobsite_id, hub_name, commute_min, commute_max,
                    listing_count_30d, listing_count_14d,
                    median_rent_min, median_rent_max, median_response_hours
             FROM hub_metrics_v
             WHERE jobsite_id = $1
             ORDER BY hub_name",
            &[DatabaseValue::String(jobsite_id.to_string())],
        )
        .await?;

    let hubs: Vec<HubMetrics> = rows
        .iter()
        .map(|row| HubMetrics {
            hub_id: row.to_value("hub_id").unwrap_or_default(),
            jobsite_id: row.to_value("jobsite_id").unwrap_or_default(),
            hub_name: row.to_value("hub_name").unwrap_or_default(),
            commute_min: row.to_value("commute_min").unwrap_or(0),
            commute_max: row.to_value("commute_max").unwrap_or(0),
            listing_count_30d: count_to_u32(row.to_value("listing_count_30d").unwrap_or(0)),
            listing_count_14d: count_to_u32(row.to_value("listing_count_14d").unwrap_or(0)),
            median_rent_min: row.to_value("median_rent_min").unwrap_or(None),
            median_rent_max: row.to_value("median_rent_max").unwrap_or(None),
            median_response_hours: row.to_value("median_response_hours").unwrap_or(None),
        })
        .collect();

    for hub in hubs.iter().filter(|h| !h.is_consistent()) {
        log::warn!(
            "Hub {} ({}) has inconsistent metrics: commute {}-{}, listings 14d={} 30d={}",
            hub.hub_name,
            hub.hub_id,
            hub.commute_min,
            hub.commute_max,
            hub.listing_count_14d,
            hub.listing_count_30d
        );
    }

    Ok(hubs)
}

/// Returns the job-site level aggregate, or `None` if the job site has no
/// row in the metrics view.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn jobsite_metrics(
    db: &dyn Database,
    jobsite_id: &str,
) -> Result<Option<JobsiteMetrics>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT jobsite_id, listings_14d, avg_response_hours
             FROM jobsite_metrics_v
             WHERE jobsite_id = $1",
            &[DatabaseValue::String(jobsite_id.to_string())],
        )
        .await?;

    Ok(rows.first().map(|row| JobsiteMetrics {
        jobsite_id: row.to_value("jobsite_id").unwrap_or_default(),
        listings_14d: count_to_u32(row.to_value("listings_14d").unwrap_or(0)),
        avg_response_hours: row.to_value("avg_response_hours").unwrap_or(None),
    }))
}

/// Builds the `WHERE` clause and parameters for a listings query.
///
/// Returns `(sql_fragment, params)`. `hub_ids` must be non-empty.
fn build_listing_filters(query: &ListingQuery) -> (String, Vec<DatabaseValue>) {
    let mut sql = String::from(" WHERE l.status = 'active' AND l.hub_id IN (");
    let mut params: Vec<DatabaseValue> = Vec::new();
    let mut idx = 1u32;

    for (i, hub_id) in query.hub_ids.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        let _ = write!(sql, "${idx}");
        params.push(DatabaseValue::String(hub_id.clone()));
        idx += 1;
    }
    sql.push(')');

    if let Some(max) = query.budget_max {
        let _ = write!(sql, " AND l.rent_min <= ${idx}");
        params.push(DatabaseValue::Real64(max));
        idx += 1;
    }

    if let Some(min) = query.budget_min {
        let _ = write!(sql, " AND l.rent_max >= ${idx}");
        params.push(DatabaseValue::Real64(min));
        idx += 1;
    }

    if let Some(room_type) = query.room_type {
        let _ = write!(sql, " AND l.room_type = ${idx}");
        params.push(DatabaseValue::String(room_type.as_ref().to_string()));
        idx += 1;
    }

    if let Some(shift) = query.shift {
        let _ = write!(
            sql,
            " AND (l.shift IS NULL OR l.shift = 'any' OR l.shift = ${idx})"
        );
        params.push(DatabaseValue::String(shift.as_ref().to_string()));
        idx += 1;
    }

    // Dates go over the wire as text and are cast server-side; binary
    // parameters can't be decoded as a Postgres DATE from a timestamp.
    if let Some(date) = query.move_in_date {
        let _ = write!(
            sql,
            " AND (l.available_from IS NULL OR l.available_from <= ${idx}::text::date)"
        );
        params.push(DatabaseValue::String(date.format("%Y-%m-%d").to_string()));
    }

    (sql, params)
}

/// Returns active listings matching the query, newest first.
///
/// Rows with an unrecognized room type or status are logged and skipped.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn query_listings(
    db: &dyn Database,
    query: &ListingQuery,
) -> Result<Vec<ListingRow>, DbError> {
    if query.hub_ids.is_empty() {
        return Ok(Vec::new());
    }

    let (where_sql, params) = build_listing_filters(query);
    let mut sql = String::from(
        "SELECT l.id, l.hub_id, l.title, l.room_type, l.rent_min, l.rent_max,
                l.available_from::text AS available_from, l.shift, l.status, l.created_at
         FROM listings l",
    );
    sql.push_str(&where_sql);
    let _ = write!(sql, " ORDER BY l.created_at DESC, l.id LIMIT {}", query.limit);

    let rows = db.query_raw_params(&sql, &params).await?;

    let mut listings = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: String = row.to_value("id").unwrap_or_default();
        let room_type: String = row.to_value("room_type").unwrap_or_default();
        let status: String = row.to_value("status").unwrap_or_default();

        let Ok(room_type) = RoomType::from_str(&room_type) else {
            log::warn!("Listing {id} has unknown room type '{room_type}', skipping");
            continue;
        };
        let Ok(status) = ListingStatus::from_str(&status) else {
            log::warn!("Listing {id} has unknown status '{status}', skipping");
            continue;
        };

        let shift: Option<String> = row.to_value("shift").unwrap_or(None);
        let available_from: Option<String> = row.to_value("available_from").unwrap_or(None);
        let created_at: NaiveDateTime = row.to_value("created_at").map_err(|e| {
            DbError::Conversion {
                message: format!("Failed to parse created_at for listing {id}: {e}"),
            }
        })?;

        listings.push(ListingRow {
            hub_id: row.to_value("hub_id").unwrap_or_default(),
            title: row.to_value("title").unwrap_or_default(),
            room_type,
            rent_min: row.to_value("rent_min").unwrap_or(0.0),
            rent_max: row.to_value("rent_max").unwrap_or(0.0),
            available_from: available_from
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            shift: shift.and_then(|s| Shift::from_str(&s).ok()),
            status,
            created_at: DateTime::<Utc>::from_naive_utc_and_offset(created_at, Utc),
            id,
        });
    }

    Ok(listings)
}

/// Inserts or updates a job site keyed on its slug and returns its id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn upsert_jobsite(db: &dyn Database, jobsite: &JobsiteRow) -> Result<String, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO jobsites (id, slug, name, employer, city, state, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (slug) DO UPDATE SET
                 name = EXCLUDED.name,
                 employer = EXCLUDED.employer,
                 city = EXCLUDED.city,
                 state = EXCLUDED.state,
                 description = EXCLUDED.description
             RETURNING id",
            &[
                DatabaseValue::String(jobsite.id.clone()),
                DatabaseValue::String(jobsite.slug.clone()),
                DatabaseValue::String(jobsite.name.clone()),
                opt_string(jobsite.employer.as_deref()),
                DatabaseValue::String(jobsite.city.clone()),
                DatabaseValue::String(jobsite.state.clone()),
                opt_string(jobsite.description.as_deref()),
            ],
        )
        .await?;

    returned_id(&rows, "job site")
}

/// Inserts or updates a hub keyed on `(jobsite_id, name)` and returns its id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn upsert_hub(db: &dyn Database, hub: &HubRow) -> Result<String, DbError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO hubs (id, jobsite_id, name, commute_min, commute_max)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (jobsite_id, name) DO UPDATE SET
                 commute_min = EXCLUDED.commute_min,
                 commute_max = EXCLUDED.commute_max
             RETURNING id",
            &[
                DatabaseValue::String(hub.id.clone()),
                DatabaseValue::String(hub.jobsite_id.clone()),
                DatabaseValue::String(hub.name.clone()),
                DatabaseValue::Int32(hub.commute_min),
                DatabaseValue::Int32(hub.commute_max),
            ],
        )
        .await?;

    returned_id(&rows, "hub")
}

/// Inserts or updates a listing keyed on its id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn upsert_listing(db: &dyn Database, listing: &ListingRow) -> Result<u64, DbError> {
    let affected = db
        .exec_raw_params(
            "INSERT INTO listings (
                id, hub_id, title, room_type, rent_min, rent_max,
                available_from, shift, status, created_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7::text::date, $8, $9, $10)
             ON CONFLICT (id) DO UPDATE SET
                 hub_id = EXCLUDED.hub_id,
                 title = EXCLUDED.title,
                 room_type = EXCLUDED.room_type,
                 rent_min = EXCLUDED.rent_min,
                 rent_max = EXCLUDED.rent_max,
                 available_from = EXCLUDED.available_from,
                 shift = EXCLUDED.shift,
                 status = EXCLUDED.status,
                 created_at = EXCLUDED.created_at",
            &[
                DatabaseValue::String(listing.id.clone()),
                DatabaseValue::String(listing.hub_id.clone()),
                DatabaseValue::String(listing.title.clone()),
                DatabaseValue::String(listing.room_type.as_ref().to_string()),
                DatabaseValue::Real64(listing.rent_min),
                DatabaseValue::Real64(listing.rent_max),
                listing.available_from.map_or(DatabaseValue::Null, |d| {
                    DatabaseValue::String(d.format("%Y-%m-%d").to_string())
                }),
                listing.shift.map_or(DatabaseValue::Null, |s| {
                    DatabaseValue::String(s.as_ref().to_string())
                }),
                DatabaseValue::String(listing.status.as_ref().to_string()),
                DatabaseValue::DateTime(listing.created_at.naive_utc()),
            ],
        )
        .await?;

    Ok(affected)
}

/// Records an introduction request, optionally already answered.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_introduction(
    db: &dyn Database,
    id: &str,
    listing_id: &str,
    requested_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
) -> Result<u64, DbError> {
    let affected = db
        .exec_raw_params(
            "INSERT INTO introduction_requests (id, listing_id, requested_at, responded_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO NOTHING",
            &[
                DatabaseValue::String(id.to_string()),
                DatabaseValue::String(listing_id.to_string()),
                DatabaseValue::DateTime(requested_at.naive_utc()),
                responded_at.map_or(DatabaseValue::Null, |dt| {
                    DatabaseValue::DateTime(dt.naive_utc())
                }),
            ],
        )
        .await?;

    Ok(affected)
}

fn returned_id(rows: &[switchy_database::Row], what: &str) -> Result<String, DbError> {
    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: format!("Failed to get {what} id from upsert"),
    })?;

    row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse {what} id: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_filters_number_params_in_order() {
        let mut query = ListingQuery::for_hubs(vec!["a".to_string(), "b".to_string()]);
        query.budget_min = Some(600.0);
        query.budget_max = Some(1000.0);
        query.room_type = Some(RoomType::PrivateRoom);
        query.shift = Some(Shift::Night);
        query.move_in_date = NaiveDate::from_ymd_opt(2026, 4, 1);

        let (sql, params) = build_listing_filters(&query);

        assert!(sql.contains("l.hub_id IN ($1, $2)"));
        assert!(sql.contains("l.rent_min <= $3"));
        assert!(sql.contains("l.rent_max >= $4"));
        assert!(sql.contains("l.room_type = $5"));
        assert!(sql.contains("l.shift = $6"));
        assert!(sql.contains("l.available_from <= $7::text::date"));
        assert_eq!(params.len(), 7);
    }

    #[test]
    fn listing_filters_without_optional_filters() {
        let query = ListingQuery::for_hubs(vec!["a".to_string()]);
        let (sql, params) = build_listing_filters(&query);
        assert_eq!(sql, " WHERE l.status = 'active' AND l.hub_id IN ($1)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn counts_clamp_into_u32() {
        assert_eq!(count_to_u32(7), 7);
        assert_eq!(count_to_u32(-3), 0);
        assert_eq!(count_to_u32(i64::MAX), u32::MAX);
    }
}
