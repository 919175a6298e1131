/// Discovery API Handlers
///
/// HTTP endpoints for the trending feed on the discovery page
use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::metrics::discovery as metrics;
use crate::models::RankedItem;
use crate::services::{FeedController, FeedSnapshot, FeedState};

pub struct DiscoveryHandlerState {
    pub controller: Arc<FeedController>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingResponse {
    pub status: String,
    pub generation: u64,
    pub items: Vec<RankedItem>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<FeedSnapshot> for TrendingResponse {
    fn from(snapshot: FeedSnapshot) -> Self {
        let status = snapshot.state.as_str().to_string();
        let (items, error) = match snapshot.state {
            FeedState::Loaded { items } => (items, None),
            FeedState::Failed { error } => (Vec::new(), Some(error)),
            _ => (Vec::new(), None),
        };

        Self {
            status,
            generation: snapshot.generation,
            count: items.len(),
            items,
            error,
            updated_at: snapshot.updated_at,
        }
    }
}

fn respond(snapshot: FeedSnapshot) -> HttpResponse {
    let failed = matches!(snapshot.state, FeedState::Failed { .. });
    let body = TrendingResponse::from(snapshot);

    if failed {
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}

/// GET /api/v1/discover/trending
///
/// Current trending list; loads it first if nothing is stored yet
#[get("/api/v1/discover/trending")]
pub async fn get_trending(state: web::Data<DiscoveryHandlerState>) -> HttpResponse {
    let snapshot = state.controller.ensure_loaded().await;
    debug!(
        "Trending request served: generation={}, status={}",
        snapshot.generation,
        snapshot.state.as_str()
    );
    respond(snapshot)
}

/// POST /api/v1/discover/refresh
#[post("/api/v1/discover/refresh")]
pub async fn refresh_trending(state: web::Data<DiscoveryHandlerState>) -> HttpResponse {
    respond(state.controller.refresh().await)
}

/// POST /api/v1/discover/invalidate
///
/// Called after catalog writes; cancels in-flight passes and recomputes
#[post("/api/v1/discover/invalidate")]
pub async fn invalidate_trending(state: web::Data<DiscoveryHandlerState>) -> HttpResponse {
    respond(state.controller.invalidate().await)
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/metrics")]
pub async fn metrics_endpoint() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::render())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_trending)
        .service(refresh_trending)
        .service(invalidate_trending)
        .service(health)
        .service(metrics_endpoint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;
    use crate::db::catalog_repo::MockCatalogSource;
    use crate::error::AppError;
    use crate::models::{ContentItemRecord, SubTrackRecord};
    use crate::services::TrendingService;
    use actix_web::{http::StatusCode, test, App};
    use std::collections::HashMap;
    use std::time::Duration;

    fn state_with(source: MockCatalogSource) -> web::Data<DiscoveryHandlerState> {
        let service = TrendingService::new(
            Arc::new(source),
            DiscoveryConfig::default(),
            Duration::from_secs(1),
        );
        web::Data::new(DiscoveryHandlerState {
            controller: Arc::new(FeedController::new(service)),
        })
    }

    fn project(id: &str) -> ContentItemRecord {
        ContentItemRecord {
            id: id.to_string(),
            title: id.to_string(),
            user_id: "owner".to_string(),
            created_at: Utc::now(),
            is_public: true,
            owner: None,
            tracks: vec![SubTrackRecord {
                id: format!("{}-t", id),
                duration: Some(125.0),
                ..Default::default()
            }],
        }
    }

    #[actix_web::test]
    async fn test_get_trending_loads_on_first_request() {
        let mut source = MockCatalogSource::new();
        source
            .expect_list_public_items()
            .times(1)
            .returning(|_| Ok(vec![project("p1")]));
        source
            .expect_sum_engagement_counters()
            .returning(|_| Ok(HashMap::new()));

        let app = test::init_service(App::new().app_data(state_with(source)).configure(configure))
            .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/discover/trending")
            .to_request();
        let body: TrendingResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "loaded");
        assert_eq!(body.count, 1);
        assert_eq!(body.items[0].item.tracks[0].duration, "2:05");

        // Second read is served from the stored list
        let req = test::TestRequest::get()
            .uri("/api/v1/discover/trending")
            .to_request();
        let body: TrendingResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.generation, 1);
    }

    #[actix_web::test]
    async fn test_get_trending_failure_is_503() {
        let mut source = MockCatalogSource::new();
        source
            .expect_list_public_items()
            .returning(|_| Err(AppError::DataSource("down".to_string())));

        let app = test::init_service(App::new().app_data(state_with(source)).configure(configure))
            .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/discover/trending")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: TrendingResponse = test::read_body_json(resp).await;
        assert_eq!(body.status, "failed");
        assert_eq!(body.error.as_deref(), Some("failed to load"));
        assert!(body.items.is_empty());
    }

    #[actix_web::test]
    async fn test_empty_catalog_is_ok_and_empty() {
        let mut source = MockCatalogSource::new();
        source.expect_list_public_items().returning(|_| Ok(vec![]));

        let app = test::init_service(App::new().app_data(state_with(source)).configure(configure))
            .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/discover/refresh")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: TrendingResponse = test::read_body_json(resp).await;
        assert_eq!(body.status, "empty");
        assert_eq!(body.count, 0);
        assert!(body.error.is_none());
    }

    #[actix_web::test]
    async fn test_invalidate_recomputes_immediately() {
        let mut source = MockCatalogSource::new();
        source
            .expect_list_public_items()
            .times(2)
            .returning(|_| Ok(vec![project("p1")]));
        source
            .expect_sum_engagement_counters()
            .returning(|_| Ok(HashMap::new()));

        let app = test::init_service(App::new().app_data(state_with(source)).configure(configure))
            .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/discover/refresh")
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/discover/invalidate")
            .to_request();
        let body: TrendingResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "loaded");
        assert_eq!(body.generation, 2);

        // Served from the recomputed list without another catalog query
        let req = test::TestRequest::get()
            .uri("/api/v1/discover/trending")
            .to_request();
        let body: TrendingResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.generation, 2);
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().service(health)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
