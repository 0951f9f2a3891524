use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metrics backend unreachable: {0}")]
    Backend(String),

    #[error("Metrics backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Metrics query failed: {0}")]
    Query(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

pub type MetricsResult<T> = Result<T, MetricsError>;

impl From<MetricsError> for AppError {
    fn from(err: MetricsError) -> Self {
        match err {
            MetricsError::Validation(msg) => AppError::BadRequest(msg),
            other => AppError::ServiceUnavailable(other.to_string()),
        }
    }
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<reqwest::Error> for MetricsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MetricsError::Query(err.to_string())
        } else {
            MetricsError::Backend(err.to_string())
        }
    }
}
