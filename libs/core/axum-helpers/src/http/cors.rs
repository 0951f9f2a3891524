use axum::http::{HeaderValue, Method, header};
use core_config::{ConfigError, Environment};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";

/// CORS layer for the given comma-separated origins.
///
/// The API is read-mostly; only GET, POST, DELETE and OPTIONS are allowed.
pub fn create_cors_layer(origins: &str) -> Result<CorsLayer, ConfigError> {
    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>().map_err(|e| ConfigError::ParseError {
                key: CORS_ALLOWED_ORIGIN.to_string(),
                details: format!("{}: {}", s, e),
            })
        })
        .collect::<Result<_, _>>()?;

    if allowed.is_empty() {
        return Err(ConfigError::ParseError {
            key: CORS_ALLOWED_ORIGIN.to_string(),
            details: "no origins listed".to_string(),
        });
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600)))
}

/// Creates a permissive CORS layer for development.
///
/// Allows any origin - **DO NOT USE IN PRODUCTION**.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Reads `CORS_ALLOWED_ORIGIN`.
///
/// Unset falls back to permissive in development and is an error in
/// production.
pub fn cors_layer_from_env(environment: &Environment) -> Result<CorsLayer, ConfigError> {
    match std::env::var(CORS_ALLOWED_ORIGIN) {
        Ok(origins) => create_cors_layer(&origins),
        Err(_) if environment.is_development() => {
            tracing::warn!("{} not set, allowing any origin", CORS_ALLOWED_ORIGIN);
            Ok(create_permissive_cors_layer())
        }
        Err(_) => Err(ConfigError::MissingEnvVar(CORS_ALLOWED_ORIGIN.to_string())),
    }
}
