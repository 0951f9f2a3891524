//! Search metrics for the movie API.
//!
//! Every series name carries the current session id, so a reset is a
//! session rotation rather than a delete:
//!
//! ```text
//! handlers ──record──▶ SearchMetrics ──▶ metrics recorder ──▶ /metrics
//!                                                               │ scrape
//! stats API ──▶ MetricsService ──PromQL──▶ MetricsBackend ◀─────┘
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod recorder;
pub mod series;
pub mod service;
pub mod session;

pub use backend::{MetricsBackend, VictoriaMetricsClient};
pub use config::MetricsBackendConfig;
pub use error::{MetricsError, MetricsResult};
pub use handlers::ApiDoc;
pub use models::*;
pub use recorder::{SearchMetrics, normalize_query, result_count_range};
pub use series::{DURATION_BUCKETS, DURATION_HISTOGRAM, SeriesNames};
pub use service::MetricsService;
pub use session::MetricsSession;
