//! Prometheus metrics for the API.
//!
//! - [`init_metrics`] installs the global recorder once
//! - [`metrics_handler`] renders the exposition for `/metrics`
//! - [`middleware::metrics_middleware`] records per-request HTTP metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{MetricsConfig, init_metrics, metrics_handler};
//!
//! init_metrics(&MetricsConfig::default())?;
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

pub mod middleware;

pub use middleware::metrics_middleware;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use metrics_util::MetricKindMask;
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Recorder settings.
#[derive(Debug, Clone, Default)]
pub struct MetricsConfig {
    /// Counters and histograms not updated for this long are dropped from
    /// the exposition. `None` keeps them forever.
    pub idle_timeout: Option<Duration>,
    /// Explicit buckets for histograms whose name starts with the prefix.
    pub histogram_buckets: Vec<(String, Vec<f64>)>,
}

impl MetricsConfig {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout: Some(idle_timeout),
            histogram_buckets: Vec::new(),
        }
    }

    pub fn with_buckets(mut self, prefix: impl Into<String>, buckets: &[f64]) -> Self {
        self.histogram_buckets.push((prefix.into(), buckets.to_vec()));
        self
    }
}

/// Builder for `config`, shared by [`init_metrics`] and tests.
pub fn prometheus_builder(config: &MetricsConfig) -> Result<PrometheusBuilder, BuildError> {
    let mut builder = PrometheusBuilder::new().set_buckets(HTTP_DURATION_BUCKETS)?;

    for (prefix, buckets) in &config.histogram_buckets {
        builder = builder.set_buckets_for_metric(Matcher::Prefix(prefix.clone()), buckets)?;
    }

    Ok(builder.idle_timeout(
        MetricKindMask::COUNTER | MetricKindMask::HISTOGRAM,
        config.idle_timeout,
    ))
}

/// Installs the Prometheus recorder.
///
/// Only the first call installs; later calls return the same handle.
pub fn init_metrics(config: &MetricsConfig) -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = prometheus_builder(config)?.install_recorder()?;

        info!(
            idle_timeout_secs = config.idle_timeout.map(|t| t.as_secs()),
            "Prometheus metrics recorder initialized"
        );
        middleware::describe_http_metrics();

        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

const HTTP_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];
