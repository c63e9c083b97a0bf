//! TOML seed loader for job sites, hubs, and listings.
//!
//! A seed document has three arrays of tables. Hubs reference job sites by
//! slug; listings reference hubs by `(jobsite slug, hub name)`. Listing
//! ages are relative (`posted_days_ago`) so demo data stays inside the
//! 14- and 30-day metric windows whenever it is loaded.
//!
//! ```toml
//! [[jobsites]]
//! slug = "taylor-fab"
//! name = "Taylor Fab"
//! city = "Taylor"
//! state = "TX"
//!
//! [[hubs]]
//! jobsite = "taylor-fab"
//! name = "Hutto"
//! commute_min = 15
//! commute_max = 25
//!
//! [[listings]]
//! jobsite = "taylor-fab"
//! hub = "Hutto"
//! title = "Private room, quiet street"
//! room_type = "private_room"
//! rent_min = 750.0
//! rent_max = 900.0
//! response_hours = [1.5, 5.0]
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate, Utc};
use hardhat_database_models::{HubRow, JobsiteRow, ListingRow, ListingStatus};
use hardhat_hub_models::{RoomType, Shift};
use serde::Deserialize;
use switchy_database::Database;

use crate::{DbError, queries};

/// Demo data set covering two job sites, embedded at compile time.
pub const DEMO_SEED: &str = include_str!("../seed/demo.toml");

/// Longest host response time a seed may record, one year in hours.
pub const MAX_RESPONSE_HOURS: f64 = 24.0 * 365.0;

/// Errors from loading or applying a seed document.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The document is not valid TOML or doesn't match the schema.
    #[error("Seed parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The document parsed but references or values are inconsistent.
    #[error("Invalid seed: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },

    /// Writing the seed to the database failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// A parsed seed document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    /// Job sites to upsert.
    pub jobsites: Vec<SeedJobsite>,
    /// Hubs to upsert.
    pub hubs: Vec<SeedHub>,
    /// Listings to upsert.
    pub listings: Vec<SeedListing>,
}

/// A job site entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedJobsite {
    /// Explicit id; generated when omitted.
    pub id: Option<String>,
    /// URL slug, unique within the document.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Employer or general contractor.
    pub employer: Option<String>,
    /// City.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// Short description.
    pub description: Option<String>,
}

/// A hub entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedHub {
    /// Explicit id; generated when omitted.
    pub id: Option<String>,
    /// Slug of the owning job site.
    pub jobsite: String,
    /// Town or neighborhood name.
    pub name: String,
    /// Best-case commute in minutes.
    pub commute_min: i32,
    /// Worst-case commute in minutes.
    pub commute_max: i32,
}

/// A listing entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedListing {
    /// Explicit id; generated when omitted.
    pub id: Option<String>,
    /// Slug of the job site the hub belongs to.
    pub jobsite: String,
    /// Name of the hub.
    pub hub: String,
    /// Short title.
    pub title: String,
    /// Kind of room.
    pub room_type: RoomType,
    /// Lowest monthly rent.
    pub rent_min: f64,
    /// Highest monthly rent.
    pub rent_max: f64,
    /// First move-in date (`YYYY-MM-DD`).
    pub available_from: Option<NaiveDate>,
    /// Preferred shift.
    pub shift: Option<Shift>,
    /// Publication state.
    #[serde(default)]
    pub status: ListingStatus,
    /// Days since posting.
    #[serde(default)]
    pub posted_days_ago: u32,
    /// Hours the host took to answer each past introduction.
    #[serde(default)]
    pub response_hours: Vec<f64>,
}

/// Number of rows written by [`apply_seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    /// Job sites upserted.
    pub jobsites: usize,
    /// Hubs upserted.
    pub hubs: usize,
    /// Listings upserted.
    pub listings: usize,
    /// Introduction requests inserted.
    pub introductions: usize,
}

/// Parses and validates a seed document.
///
/// # Errors
///
/// Returns [`SeedError`] if the TOML is malformed or fails validation.
pub fn parse_seed(toml_str: &str) -> Result<SeedFile, SeedError> {
    let seed: SeedFile = toml::de::from_str(toml_str)?;
    validate(&seed)?;
    Ok(seed)
}

fn invalid(message: String) -> SeedError {
    SeedError::Invalid { message }
}

/// Checks references between entries and value invariants.
///
/// # Errors
///
/// Returns [`SeedError::Invalid`] describing the first problem found.
pub fn validate(seed: &SeedFile) -> Result<(), SeedError> {
    let mut slugs = BTreeSet::new();
    for jobsite in &seed.jobsites {
        if !slugs.insert(jobsite.slug.as_str()) {
            return Err(invalid(format!("duplicate job site slug '{}'", jobsite.slug)));
        }
    }

    let mut hubs = BTreeSet::new();
    for hub in &seed.hubs {
        if !slugs.contains(hub.jobsite.as_str()) {
            return Err(invalid(format!(
                "hub '{}' references unknown job site '{}'",
                hub.name, hub.jobsite
            )));
        }
        if hub.commute_min < 0 || hub.commute_min > hub.commute_max {
            return Err(invalid(format!(
                "hub '{}' has invalid commute band {}-{}",
                hub.name, hub.commute_min, hub.commute_max
            )));
        }
        if !hubs.insert((hub.jobsite.as_str(), hub.name.as_str())) {
            return Err(invalid(format!(
                "duplicate hub '{}' for job site '{}'",
                hub.name, hub.jobsite
            )));
        }
    }

    for listing in &seed.listings {
        if !hubs.contains(&(listing.jobsite.as_str(), listing.hub.as_str())) {
            return Err(invalid(format!(
                "listing '{}' references unknown hub '{}' at '{}'",
                listing.title, listing.hub, listing.jobsite
            )));
        }
        if !listing.rent_min.is_finite()
            || !listing.rent_max.is_finite()
            || listing.rent_min < 0.0
            || listing.rent_min > listing.rent_max
        {
            return Err(invalid(format!(
                "listing '{}' has invalid rent range {}-{}",
                listing.title, listing.rent_min, listing.rent_max
            )));
        }
        if listing
            .response_hours
            .iter()
            .any(|h| !h.is_finite() || *h < 0.0 || *h > MAX_RESPONSE_HOURS)
        {
            return Err(invalid(format!(
                "listing '{}' has a response time outside 0-{MAX_RESPONSE_HOURS} hours",
                listing.title
            )));
        }
    }

    Ok(())
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Upserts every entry of a validated seed document.
///
/// Job sites are keyed on slug and hubs on `(job site, name)`, so applying
/// the same document twice updates rows in place. Listings without an
/// explicit id get a fresh one each time.
///
/// # Errors
///
/// Returns [`SeedError`] if a reference can't be resolved or a write fails.
pub async fn apply_seed(db: &dyn Database, seed: &SeedFile) -> Result<SeedStats, SeedError> {
    let mut stats = SeedStats::default();
    let mut jobsite_ids: BTreeMap<&str, String> = BTreeMap::new();
    let mut hub_ids: BTreeMap<(&str, &str), String> = BTreeMap::new();

    for jobsite in &seed.jobsites {
        let row = JobsiteRow {
            id: jobsite.id.clone().unwrap_or_else(new_id),
            slug: jobsite.slug.clone(),
            name: jobsite.name.clone(),
            employer: jobsite.employer.clone(),
            city: jobsite.city.clone(),
            state: jobsite.state.to_uppercase(),
            description: jobsite.description.clone(),
        };
        let id = queries::upsert_jobsite(db, &row).await?;
        jobsite_ids.insert(jobsite.slug.as_str(), id);
        stats.jobsites += 1;
    }

    for hub in &seed.hubs {
        let jobsite_id = jobsite_ids
            .get(hub.jobsite.as_str())
            .ok_or_else(|| invalid(format!("unknown job site '{}'", hub.jobsite)))?;
        let row = HubRow {
            id: hub.id.clone().unwrap_or_else(new_id),
            jobsite_id: jobsite_id.clone(),
            name: hub.name.clone(),
            commute_min: hub.commute_min,
            commute_max: hub.commute_max,
        };
        let id = queries::upsert_hub(db, &row).await?;
        hub_ids.insert((hub.jobsite.as_str(), hub.name.as_str()), id);
        stats.hubs += 1;
    }

    let now = Utc::now();
    for listing in &seed.listings {
        let hub_id = hub_ids
            .get(&(listing.jobsite.as_str(), listing.hub.as_str()))
            .ok_or_else(|| invalid(format!("unknown hub '{}'", listing.hub)))?;
        let created_at = now - Duration::days(i64::from(listing.posted_days_ago));
        let row = ListingRow {
            id: listing.id.clone().unwrap_or_else(new_id),
            hub_id: hub_id.clone(),
            title: listing.title.clone(),
            room_type: listing.room_type,
            rent_min: listing.rent_min,
            rent_max: listing.rent_max,
            available_from: listing.available_from,
            shift: listing.shift,
            status: listing.status,
            created_at,
        };
        queries::upsert_listing(db, &row).await?;
        stats.listings += 1;

        for (i, hours) in listing.response_hours.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let minutes = (hours * 60.0).round() as i64;
            let requested_at = created_at + Duration::hours(1);
            let responded_at = requested_at + Duration::minutes(minutes);
            queries::insert_introduction(
                db,
                &format!("{}-intro-{i}", row.id),
                &row.id,
                requested_at,
                Some(responded_at),
            )
            .await?;
            stats.introductions += 1;
        }
    }

    log::info!(
        "Seeded {} job sites, {} hubs, {} listings, {} introductions",
        stats.jobsites,
        stats.hubs,
        stats.listings,
        stats.introductions
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_seed_parses_and_validates() {
        let seed = parse_seed(DEMO_SEED).unwrap();
        assert!(seed.jobsites.len() >= 2);
        assert!(!seed.hubs.is_empty());
        assert!(!seed.listings.is_empty());
    }

    #[test]
    fn demo_seed_has_a_scarce_and_a_stocked_jobsite() {
        let seed = parse_seed(DEMO_SEED).unwrap();
        let recent = |slug: &str| {
            seed.listings
                .iter()
                .filter(|l| {
                    l.jobsite == slug
                        && l.status == ListingStatus::Active
                        && l.posted_days_ago < 14
                })
                .count()
        };
        let counts: Vec<usize> = seed.jobsites.iter().map(|j| recent(&j.slug)).collect();
        assert!(counts.iter().any(|c| *c < 5), "{counts:?}");
        assert!(counts.iter().any(|c| *c >= 5), "{counts:?}");
    }

    #[test]
    fn rejects_hub_with_unknown_jobsite() {
        let err = parse_seed(
            r#"
            [[hubs]]
            jobsite = "nowhere"
            name = "Ghost Town"
            commute_min = 5
            commute_max = 10
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown job site"), "{err}");
    }

    #[test]
    fn rejects_inverted_commute_band() {
        let err = parse_seed(
            r#"
            [[jobsites]]
            slug = "fab"
            name = "Fab"
            city = "Taylor"
            state = "TX"

            [[hubs]]
            jobsite = "fab"
            name = "Hutto"
            commute_min = 30
            commute_max = 10
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("commute band"), "{err}");
    }

    #[test]
    fn rejects_listing_with_unknown_hub_and_bad_rent() {
        let base = r#"
            [[jobsites]]
            slug = "fab"
            name = "Fab"
            city = "Taylor"
            state = "TX"

            [[hubs]]
            jobsite = "fab"
            name = "Hutto"
            commute_min = 10
            commute_max = 20
        "#;

        let unknown_hub = format!(
            "{base}
            [[listings]]
            jobsite = \"fab\"
            hub = \"Elgin\"
            title = \"Room\"
            room_type = \"private_room\"
            rent_min = 700.0
            rent_max = 800.0
            "
        );
        assert!(matches!(parse_seed(&unknown_hub), Err(SeedError::Invalid { .. })));

        let bad_rent = format!(
            "{base}
            [[listings]]
            jobsite = \"fab\"
            hub = \"Hutto\"
            title = \"Room\"
            room_type = \"private_room\"
            rent_min = 900.0
            rent_max = 800.0
            "
        );
        assert!(matches!(parse_seed(&bad_rent), Err(SeedError::Invalid { .. })));
    }

    #[test]
    fn rejects_non_finite_response_hours_and_rent() {
        let base = r#"
            [[jobsites]]
            slug = "fab"
            name = "Fab"
            city = "Taylor"
            state = "TX"

            [[hubs]]
            jobsite = "fab"
            name = "Hutto"
            commute_min = 10
            commute_max = 20
        "#;
        let listing = |rent_min: &str, rent_max: &str, hours: &str| {
            format!(
                "{base}
                [[listings]]
                jobsite = \"fab\"
                hub = \"Hutto\"
                title = \"Room\"
                room_type = \"private_room\"
                rent_min = {rent_min}
                rent_max = {rent_max}
                response_hours = [{hours}]
                "
            )
        };

        for doc in [
            listing("700.0", "800.0", "inf"),
            listing("700.0", "800.0", "1e18"),
            listing("700.0", "800.0", "nan"),
            listing("nan", "800.0", "2.0"),
            listing("700.0", "inf", "2.0"),
        ] {
            assert!(
                matches!(parse_seed(&doc), Err(SeedError::Invalid { .. })),
                "{doc}"
            );
        }

        assert!(parse_seed(&listing("700.0", "800.0", "8760.0")).is_ok());
    }

    #[test]
    fn rejects_unknown_room_type() {
        let err = parse_seed(
            r#"
            [[jobsites]]
            slug = "fab"
            name = "Fab"
            city = "Taylor"
            state = "TX"

            [[hubs]]
            jobsite = "fab"
            name = "Hutto"
            commute_min = 10
            commute_max = 20

            [[listings]]
            jobsite = "fab"
            hub = "Hutto"
            title = "Room"
            room_type = "treehouse"
            rent_min = 700.0
            rent_max = 800.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SeedError::Parse(_)));
    }

    #[test]
    fn empty_document_is_valid() {
        let seed = parse_seed("").unwrap();
        assert!(seed.jobsites.is_empty());
    }
}
