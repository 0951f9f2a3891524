use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_helpers::errors::responses::{
    BadRequestValidationResponse, InternalServerErrorResponse, ServiceUnavailableResponse,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::backend::MetricsBackend;
use crate::error::MetricsResult;
use crate::models::{
    DayPeriod, GeneralStats, HourlyStatItem, HourlyStats, OverviewStats, PerformanceStats,
    ResetResponse, SearchTimeline, StatusCategory, StatusCodeStatItem, StatusCodeStats,
    TimelinePoint, TimelineQuery, TopSearchItem, TopSearches, TopSearchesQuery, UsageStats,
};
use crate::service::MetricsService;

/// OpenAPI documentation for the search statistics API
#[derive(OpenApi)]
#[openapi(
    paths(
        general_stats,
        reset_stats,
        top_searches,
        performance_stats,
        hourly_stats,
        status_code_stats,
        search_timeline,
    ),
    components(
        schemas(
            GeneralStats, OverviewStats, PerformanceStats, UsageStats,
            TopSearches, TopSearchItem,
            HourlyStats, HourlyStatItem, DayPeriod,
            StatusCodeStats, StatusCodeStatItem, StatusCategory,
            SearchTimeline, TimelinePoint, ResetResponse
        ),
        responses(
            BadRequestValidationResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Stats", description = "Movie search statistics")
    )
)]
pub struct ApiDoc;

/// Statistics router, mounted under `/api/movies/stats`
pub fn router<B: MetricsBackend + 'static>(service: MetricsService<B>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(general_stats).delete(reset_stats))
        .route("/top-searches", get(top_searches))
        .route("/performance", get(performance_stats))
        .route("/hourly", get(hourly_stats))
        .route("/status-codes", get(status_code_stats))
        .route("/timeline", get(search_timeline))
        .with_state(shared_service)
}

/// Overview, performance and usage for the current session
#[utoipa::path(
    get,
    path = "",
    tag = "Stats",
    responses(
        (status = 200, description = "General statistics", body = GeneralStats),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn general_stats<B: MetricsBackend>(
    State(service): State<Arc<MetricsService<B>>>,
) -> MetricsResult<Json<GeneralStats>> {
    Ok(Json(service.general_stats().await?))
}

/// Reset all statistics by starting a new metrics session
#[utoipa::path(
    delete,
    path = "",
    tag = "Stats",
    responses(
        (status = 200, description = "Statistics reset", body = ResetResponse)
    )
)]
async fn reset_stats<B: MetricsBackend>(
    State(service): State<Arc<MetricsService<B>>>,
) -> Json<ResetResponse> {
    let success = service.delete_all_metrics();
    Json(ResetResponse {
        success,
        session: service.current_session(),
    })
}

/// Most frequent search queries
#[utoipa::path(
    get,
    path = "/top-searches",
    tag = "Stats",
    params(TopSearchesQuery),
    responses(
        (status = 200, description = "Top searches", body = TopSearches),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn top_searches<B: MetricsBackend>(
    State(service): State<Arc<MetricsService<B>>>,
    Query(params): Query<TopSearchesQuery>,
) -> MetricsResult<Json<TopSearches>> {
    Ok(Json(service.top_searches(params.limit).await?))
}

/// Average and p95 response time
#[utoipa::path(
    get,
    path = "/performance",
    tag = "Stats",
    responses(
        (status = 200, description = "Response time statistics", body = PerformanceStats)
    )
)]
async fn performance_stats<B: MetricsBackend>(
    State(service): State<Arc<MetricsService<B>>>,
) -> Json<PerformanceStats> {
    Json(service.performance_stats().await)
}

/// Searches per hour of day
#[utoipa::path(
    get,
    path = "/hourly",
    tag = "Stats",
    responses(
        (status = 200, description = "Hourly distribution", body = HourlyStats),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn hourly_stats<B: MetricsBackend>(
    State(service): State<Arc<MetricsService<B>>>,
) -> MetricsResult<Json<HourlyStats>> {
    Ok(Json(service.hourly_stats().await?))
}

/// Response status code distribution
#[utoipa::path(
    get,
    path = "/status-codes",
    tag = "Stats",
    responses(
        (status = 200, description = "Status code distribution", body = StatusCodeStats),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn status_code_stats<B: MetricsBackend>(
    State(service): State<Arc<MetricsService<B>>>,
) -> MetricsResult<Json<StatusCodeStats>> {
    Ok(Json(service.status_code_stats().await?))
}

/// Search volume over time
#[utoipa::path(
    get,
    path = "/timeline",
    tag = "Stats",
    params(TimelineQuery),
    responses(
        (status = 200, description = "Search timeline", body = SearchTimeline),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn search_timeline<B: MetricsBackend>(
    State(service): State<Arc<MetricsService<B>>>,
    Query(params): Query<TimelineQuery>,
) -> MetricsResult<Json<SearchTimeline>> {
    Ok(Json(
        service
            .search_timeline(params.hours, params.step_minutes)
            .await?,
    ))
}
