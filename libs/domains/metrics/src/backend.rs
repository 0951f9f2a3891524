//! Read side transport: PromQL over the Prometheus HTTP API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::MetricsBackendConfig;
use crate::error::{MetricsError, MetricsResult};

/// Time-series store the read side queries.
///
/// Both methods return the full response body; callers pull samples out of
/// `data.result` with the helpers in [`crate::extract`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Instant query.
    async fn query(&self, expr: &str) -> MetricsResult<Value>;

    /// Range query between `start` and `end`, one point per `step`.
    async fn query_range(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> MetricsResult<Value>;
}

/// VictoriaMetrics (or any Prometheus-compatible) query client.
#[derive(Debug, Clone)]
pub struct VictoriaMetricsClient {
    client: reqwest::Client,
    base_url: String,
}

impl VictoriaMetricsClient {
    pub fn new(config: &MetricsBackendConfig) -> MetricsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MetricsError::Backend(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> MetricsResult<Value> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.get(&url).query(params).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Metrics query rejected");
            return Err(MetricsError::Status { status, body });
        }

        let body: Value = response.json().await?;
        match body.get("status").and_then(Value::as_str) {
            Some("success") => Ok(body),
            _ => {
                let reason = body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("missing success status")
                    .to_string();
                Err(MetricsError::Query(reason))
            }
        }
    }
}

#[async_trait]
impl MetricsBackend for VictoriaMetricsClient {
    #[instrument(skip(self))]
    async fn query(&self, expr: &str) -> MetricsResult<Value> {
        debug!("Running instant query");
        self.get("/api/v1/query", &[("query", expr.to_string())])
            .await
    }

    #[instrument(skip(self))]
    async fn query_range(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> MetricsResult<Value> {
        debug!("Running range query");
        self.get(
            "/api/v1/query_range",
            &[
                ("query", expr.to_string()),
                ("start", start.timestamp().to_string()),
                ("end", end.timestamp().to_string()),
                ("step", step_param(step)),
            ],
        )
        .await
    }
}

/// Step as a PromQL duration in whole seconds, at least `1s`.
pub fn step_param(step: Duration) -> String {
    format!("{}s", step.as_secs().max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Matcher;

    async fn client_for(server: &mockito::ServerGuard) -> VictoriaMetricsClient {
        VictoriaMetricsClient::new(&MetricsBackendConfig::new(server.url())).unwrap()
    }

    #[tokio::test]
    async fn test_query_sends_expression() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/query")
            .match_query(Matcher::UrlEncoded(
                "query".into(),
                "sum(movie_byid_queries_total_s_1)".into(),
            ))
            .with_status(200)
            .with_body(r#"{"status":"success","data":{"resultType":"vector","result":[{"metric":{},"value":[1714824000,"7"]}]}}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let body = client.query("sum(movie_byid_queries_total_s_1)").await.unwrap();

        assert_eq!(body["data"]["result"][0]["value"][1], "7");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_range_sends_window() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/query_range")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "up".into()),
                Matcher::UrlEncoded("start".into(), "1714820400".into()),
                Matcher::UrlEncoded("end".into(), "1714824000".into()),
                Matcher::UrlEncoded("step".into(), "600s".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"status":"success","data":{"resultType":"matrix","result":[]}}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let end = Utc.timestamp_opt(1_714_824_000, 0).unwrap();
        let start = Utc.timestamp_opt(1_714_820_400, 0).unwrap();
        let result = client
            .query_range("up", start, end, Duration::from_secs(600))
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/query")
            .match_query(Matcher::Any)
            .with_status(422)
            .with_body("bad query")
            .create_async()
            .await;

        let client = client_for(&server).await;
        let err = client.query("sum(").await.unwrap_err();

        assert!(matches!(err, MetricsError::Status { status: 422, .. }));
    }

    #[tokio::test]
    async fn test_error_payload_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/query")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"error","errorType":"bad_data","error":"parse error"}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let err = client.query("sum(").await.unwrap_err();

        assert!(matches!(err, MetricsError::Query(reason) if reason == "parse error"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        let config = MetricsBackendConfig::new("http://127.0.0.1:1")
            .with_timeout(Duration::from_millis(500));
        let client = VictoriaMetricsClient::new(&config).unwrap();

        let err = client.query("up").await.unwrap_err();

        assert!(matches!(err, MetricsError::Backend(_)));
    }

    #[test]
    fn test_step_param() {
        assert_eq!(step_param(Duration::from_secs(3600)), "3600s");
        assert_eq!(step_param(Duration::from_millis(10)), "1s");
    }
}
