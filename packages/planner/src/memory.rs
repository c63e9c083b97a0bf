//! In-memory [`HousingStore`] for tests and fixtures.

use async_trait::async_trait;
use hardhat_database_models::{JobsiteRef, JobsiteRow, ListingQuery, ListingRow};
use hardhat_hub_models::{HubMetrics, JobsiteMetrics};

use crate::{HousingStore, StoreError};

/// A [`HousingStore`] over plain vectors.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    /// Known job sites.
    pub jobsites: Vec<JobsiteRow>,
    /// Hub metrics for every job site.
    pub hub_metrics: Vec<HubMetrics>,
    /// Job-site aggregates.
    pub jobsite_metrics: Vec<JobsiteMetrics>,
    /// Listings across all hubs.
    pub listings: Vec<ListingRow>,
}

impl InMemoryStore {
    /// Adds a job site.
    #[must_use]
    pub fn with_jobsite(mut self, jobsite: JobsiteRow) -> Self {
        self.jobsites.push(jobsite);
        self
    }

    /// Adds hub metrics.
    #[must_use]
    pub fn with_hubs(mut self, hubs: impl IntoIterator<Item = HubMetrics>) -> Self {
        self.hub_metrics.extend(hubs);
        self
    }

    /// Adds a job-site aggregate.
    #[must_use]
    pub fn with_jobsite_metrics(mut self, metrics: JobsiteMetrics) -> Self {
        self.jobsite_metrics.push(metrics);
        self
    }

    /// Adds listings.
    #[must_use]
    pub fn with_listings(mut self, listings: impl IntoIterator<Item = ListingRow>) -> Self {
        self.listings.extend(listings);
        self
    }
}

#[async_trait]
impl HousingStore for InMemoryStore {
    async fn jobsites(&self) -> Result<Vec<JobsiteRow>, StoreError> {
        let mut rows = self.jobsites.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn resolve_jobsite(
        &self,
        jobsite: &JobsiteRef,
    ) -> Result<Option<JobsiteRow>, StoreError> {
        Ok(self
            .jobsites
            .iter()
            .find(|row| match jobsite {
                JobsiteRef::Id(id) => row.id == *id,
                JobsiteRef::Slug(slug) => row.slug == *slug,
            })
            .cloned())
    }

    async fn hub_metrics(&self, jobsite_id: &str) -> Result<Vec<HubMetrics>, StoreError> {
        Ok(self
            .hub_metrics
            .iter()
            .filter(|hub| hub.jobsite_id == jobsite_id)
            .cloned()
            .collect())
    }

    async fn jobsite_metrics(
        &self,
        jobsite_id: &str,
    ) -> Result<Option<JobsiteMetrics>, StoreError> {
        Ok(self
            .jobsite_metrics
            .iter()
            .find(|m| m.jobsite_id == jobsite_id)
            .cloned())
    }

    async fn listings(&self, query: &ListingQuery) -> Result<Vec<ListingRow>, StoreError> {
        let mut rows: Vec<ListingRow> = self
            .listings
            .iter()
            .filter(|listing| query.matches(listing))
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        rows.truncate(usize::try_from(query.limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}
