//! Postgres-backed [`HousingStore`].

use std::sync::Arc;

use async_trait::async_trait;
use hardhat_database::{DbError, queries};
use hardhat_database_models::{JobsiteRef, JobsiteRow, ListingQuery, ListingRow};
use hardhat_hub_models::{HubMetrics, JobsiteMetrics};
use hardhat_planner::{HousingStore, StoreError};
use switchy_database::Database;

/// Reads job sites, metrics views, and listings through `switchy_database`.
pub struct PgHousingStore {
    db: Arc<dyn Database>,
}

impl PgHousingStore {
    /// Wraps an open database connection.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

fn backend(e: DbError) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl HousingStore for PgHousingStore {
    async fn jobsites(&self) -> Result<Vec<JobsiteRow>, StoreError> {
        queries::list_jobsites(self.db.as_ref()).await.map_err(backend)
    }

    async fn resolve_jobsite(
        &self,
        jobsite: &JobsiteRef,
    ) -> Result<Option<JobsiteRow>, StoreError> {
        queries::find_jobsite(self.db.as_ref(), jobsite)
            .await
            .map_err(backend)
    }

    async fn hub_metrics(&self, jobsite_id: &str) -> Result<Vec<HubMetrics>, StoreError> {
        queries::hub_metrics_for_jobsite(self.db.as_ref(), jobsite_id)
            .await
            .map_err(backend)
    }

    async fn jobsite_metrics(
        &self,
        jobsite_id: &str,
    ) -> Result<Option<JobsiteMetrics>, StoreError> {
        queries::jobsite_metrics(self.db.as_ref(), jobsite_id)
            .await
            .map_err(backend)
    }

    async fn listings(&self, query: &ListingQuery) -> Result<Vec<ListingRow>, StoreError> {
        queries::query_listings(self.db.as_ref(), query)
            .await
            .map_err(backend)
    }
}
