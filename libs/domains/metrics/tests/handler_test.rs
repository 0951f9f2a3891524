//! Stats router tests against a stubbed Prometheus query API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use domain_metrics::*;
use http_body_util::BodyExt;
use mockito::Matcher;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app(server: &mockito::ServerGuard) -> axum::Router {
    let client = VictoriaMetricsClient::new(&MetricsBackendConfig::new(server.url())).unwrap();
    let session = Arc::new(MetricsSession::new(Utc::now()));
    handlers::router(MetricsService::new(client, session))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_top_searches_handler() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/query")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({"status": "success", "data": {"resultType": "vector", "result": [
                {"metric": {"query": "yoda"}, "value": [1, "3"]},
                {"metric": {"query": "leia"}, "value": [1, "1"]}
            ]}})
            .to_string(),
        )
        .create_async()
        .await;

    let response = app(&server)
        .oneshot(get("/top-searches?limit=5"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let top: TopSearches = json_body(response.into_body()).await;
    assert_eq!(top.total_searches, 4);
    assert_eq!(top.limit, 5);
    assert_eq!(top.top_searches[0].query, "yoda");
    assert_eq!(top.top_searches[0].percentage, 75.0);
}

#[tokio::test]
async fn test_top_searches_backend_down_is_503() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/query")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let response = app(&server).oneshot(get("/top-searches")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_performance_handler_degrades_to_zeros() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/query")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let response = app(&server).oneshot(get("/performance")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["average_response_time_ms"], 0.0);
    assert_eq!(body["p95_response_time_ms"], 0.0);
    assert_eq!(body["total_requests"], 0);
}

#[tokio::test]
async fn test_reset_handler_rotates_session() {
    let server = mockito::Server::new_async().await;
    let app = app(&server);

    let request = Request::builder()
        .method("DELETE")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ResetResponse = json_body(response.into_body()).await;
    assert!(body.success);
    assert!(body.session.starts_with("s_"));
}

#[tokio::test]
async fn test_timeline_rejects_bad_window() {
    let server = mockito::Server::new_async().await;

    let response = app(&server)
        .oneshot(get("/timeline?hours=0"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
