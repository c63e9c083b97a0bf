//! HTTP handler functions for the hardhat housing API.

use actix_web::{HttpResponse, web};
use hardhat_database_models::JobsiteRef;
use hardhat_hub_models::FilterCriteria;
use hardhat_planner::{DEFAULT_COMMUTE_MAX_MINUTES, PlanError, plan_move, ranked_hubs_for};
use hardhat_server_models::{
    ApiError, ApiHealth, ApiJobsite, JobsiteHubsParams, JobsiteHubsResponse, PlanMoveParams,
};

use crate::AppState;

/// Maps a planning failure to a response. Store errors are logged and
/// hidden behind a generic message.
fn plan_error(e: &PlanError, what: &str) -> HttpResponse {
    match e {
        PlanError::InvalidCriteria { message } => {
            HttpResponse::BadRequest().json(ApiError::new(message.as_str()))
        }
        PlanError::Store(e) => {
            log::error!("Failed to {what}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new(format!("Failed to {what}")))
        }
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/jobsites`
pub async fn jobsites(state: web::Data<AppState>) -> HttpResponse {
    match state.store.jobsites().await {
        Ok(rows) => {
            let jobsites: Vec<ApiJobsite> = rows.into_iter().map(ApiJobsite::from).collect();
            HttpResponse::Ok().json(jobsites)
        }
        Err(e) => {
            log::error!("Failed to list job sites: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to list job sites"))
        }
    }
}

/// `GET /api/jobsites/{slug}`
pub async fn jobsite(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let slug = path.into_inner();

    match state
        .store
        .resolve_jobsite(&JobsiteRef::Slug(slug.clone()))
        .await
    {
        Ok(Some(row)) => HttpResponse::Ok().json(ApiJobsite::from(row)),
        Ok(None) => HttpResponse::NotFound().json(ApiError::new(format!(
            "Job site not found: {slug}"
        ))),
        Err(e) => {
            log::error!("Failed to look up job site {slug}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to look up job site"))
        }
    }
}

/// `GET /api/jobsites/{slug}/hubs`
///
/// Ranks the job site's hubs without budget filters. `commute_max`
/// defaults to 45 minutes.
pub async fn jobsite_hubs(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<JobsiteHubsParams>,
) -> HttpResponse {
    let slug = path.into_inner();
    let commute_max = params.commute_max.unwrap_or(DEFAULT_COMMUTE_MAX_MINUTES);

    if commute_max <= 0 {
        return HttpResponse::BadRequest().json(ApiError::new(format!(
            "commute_max must be a positive number of minutes, got {commute_max}"
        )));
    }

    let filters = FilterCriteria::with_commute_max(commute_max);

    match ranked_hubs_for(
        state.store.as_ref(),
        &JobsiteRef::Slug(slug.clone()),
        &filters,
    )
    .await
    {
        Ok(Some((row, hubs))) => HttpResponse::Ok().json(JobsiteHubsResponse {
            jobsite: row.into(),
            commute_max,
            hubs,
        }),
        Ok(None) => HttpResponse::NotFound().json(ApiError::new(format!(
            "Job site not found: {slug}"
        ))),
        Err(e) => plan_error(&e, "rank hubs"),
    }
}

/// `GET /api/plan-move`
///
/// Criteria come from the query string.
pub async fn plan_move_get(
    state: web::Data<AppState>,
    params: web::Query<PlanMoveParams>,
) -> HttpResponse {
    plan(&state, &params).await
}

/// `POST /api/plan-move`
///
/// Criteria come from the JSON body.
pub async fn plan_move_post(
    state: web::Data<AppState>,
    body: web::Json<PlanMoveParams>,
) -> HttpResponse {
    plan(&state, &body).await
}

async fn plan(state: &AppState, params: &PlanMoveParams) -> HttpResponse {
    match plan_move(state.store.as_ref(), params).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => plan_error(&e, "plan move"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use async_trait::async_trait;
    use chrono::Utc;
    use hardhat_database_models::{JobsiteRow, ListingQuery, ListingRow, ListingStatus};
    use hardhat_hub_models::{HubMetrics, JobsiteMetrics, RoomType};
    use hardhat_planner::memory::InMemoryStore;
    use hardhat_planner::{HousingStore, StoreError};
    use serde_json::Value;

    use crate::{AppState, configure};

    fn hub(id: &str, name: &str, commute_min: i32, commute_max: i32, count: u32) -> HubMetrics {
        HubMetrics {
            hub_id: id.to_string(),
            jobsite_id: "js1".to_string(),
            hub_name: name.to_string(),
            commute_min,
            commute_max,
            listing_count_30d: count,
            listing_count_14d: count,
            median_rent_min: Some(800.0),
            median_rent_max: Some(1000.0),
            median_response_hours: Some(3.0),
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::default()
            .with_jobsite(JobsiteRow {
                id: "js1".to_string(),
                slug: "taylor-fab".to_string(),
                name: "Taylor Fab".to_string(),
                employer: Some("Samsung".to_string()),
                city: "Taylor".to_string(),
                state: "TX".to_string(),
                description: None,
            })
            .with_hubs([
                hub("h1", "Taylor", 5, 15, 8),
                hub("h2", "Hutto", 15, 25, 3),
                hub("h3", "North Austin", 35, 60, 12),
            ])
            .with_jobsite_metrics(JobsiteMetrics {
                jobsite_id: "js1".to_string(),
                listings_14d: 2,
                avg_response_hours: Some(5.0),
            })
            .with_listings([ListingRow {
                id: "l1".to_string(),
                hub_id: "h1".to_string(),
                title: "Quiet room".to_string(),
                room_type: RoomType::PrivateRoom,
                rent_min: 750.0,
                rent_max: 900.0,
                available_from: None,
                shift: None,
                status: ListingStatus::Active,
                created_at: Utc::now(),
            }])
    }

    struct FailingStore;

    #[async_trait]
    impl HousingStore for FailingStore {
        async fn jobsites(&self) -> Result<Vec<JobsiteRow>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn resolve_jobsite(
            &self,
            _jobsite: &hardhat_database_models::JobsiteRef,
        ) -> Result<Option<JobsiteRow>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn hub_metrics(&self, _jobsite_id: &str) -> Result<Vec<HubMetrics>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn jobsite_metrics(
            &self,
            _jobsite_id: &str,
        ) -> Result<Option<JobsiteMetrics>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn listings(&self, _query: &ListingQuery) -> Result<Vec<ListingRow>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    fn state(store: impl HousingStore + 'static) -> web::Data<AppState> {
        web::Data::new(AppState {
            store: Arc::new(store),
        })
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().app_data(state(store())).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn plan_move_from_query_string() {
        let app = test::init_service(App::new().app_data(state(store())).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/plan-move?jobsite_slug=taylor-fab&budget_min=600&budget_max=1000&commute_max=30")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let hubs = body["hubs"].as_array().unwrap();
        assert_eq!(hubs.len(), 2);
        assert_eq!(hubs[0]["hub_id"], "h1");
        assert_eq!(hubs[0]["budget_match"], true);
        assert_eq!(body["listings"][0]["id"], "l1");
        assert_eq!(body["jobsite"]["slug"], "taylor-fab");
        assert_eq!(body["scarcity"]["listings_14d"], 2);
        assert_eq!(body["scarcity"]["is_scarce"], true);
    }

    #[actix_web::test]
    async fn plan_move_from_json_body() {
        let app = test::init_service(App::new().app_data(state(store())).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/plan-move")
            .set_json(serde_json::json!({ "jobsite_id": "js1", "commute_max": 90 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["hubs"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn unknown_jobsite_fails_open() {
        let app = test::init_service(App::new().app_data(state(store())).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/plan-move?jobsite_slug=nowhere")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["jobsite"].is_null());
        assert_eq!(body["hubs"], serde_json::json!([]));
        assert_eq!(body["scarcity"]["is_scarce"], true);
    }

    #[actix_web::test]
    async fn invalid_criteria_is_bad_request() {
        let app = test::init_service(App::new().app_data(state(store())).configure(configure)).await;

        for uri in [
            "/api/plan-move",
            "/api/plan-move?jobsite_slug=taylor-fab&commute_max=0",
            "/api/plan-move?jobsite_slug=taylor-fab&budget_min=1200&budget_max=900",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body: Value = test::read_body_json(resp).await;
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[actix_web::test]
    async fn malformed_input_gets_json_error_body() {
        let app = test::init_service(App::new().app_data(state(store())).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/plan-move?jobsite_slug=taylor-fab&commute_max=30.5")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());

        let req = test::TestRequest::get()
            .uri("/api/jobsites/taylor-fab/hubs?commute_max=abc")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());

        let req = test::TestRequest::post()
            .uri("/api/plan-move")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"jobsite_slug": "taylor-fab", "commute_max": 30.5}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn store_failure_is_internal_error() {
        let app = test::init_service(App::new().app_data(state(FailingStore)).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/plan-move?jobsite_slug=taylor-fab")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Failed to plan move");

        let req = test::TestRequest::get().uri("/api/jobsites").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn jobsite_lookup_and_hubs() {
        let app = test::init_service(App::new().app_data(state(store())).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/jobsites").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/jobsites/taylor-fab")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["employer"], "Samsung");

        let req = test::TestRequest::get()
            .uri("/api/jobsites/nowhere")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/jobsites/taylor-fab/hubs")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["commute_max"], 45);
        assert_eq!(body["hubs"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri("/api/jobsites/taylor-fab/hubs?commute_max=-5")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
