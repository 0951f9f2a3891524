use core_config::{AppInfo, FromEnv, app_info, env_parse, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_catalog::SwapiConfig;
use domain_metrics::MetricsBackendConfig;
use messaging::ProcessorConfig;
use std::time::Duration;

pub use core_config::Environment;

/// Application configuration, composed from the shared config pieces.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub swapi: SwapiConfig,
    pub metrics_backend: MetricsBackendConfig,
    pub processor: ProcessorConfig,
    /// Series untouched for this long drop out of `/metrics`.
    pub metrics_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let metrics_idle_secs: u64 = env_parse("METRICS_IDLE_TIMEOUT_SECS", "3600")?;

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            mongodb: MongoConfig::from_env()?,
            swapi: SwapiConfig::from_env()?,
            metrics_backend: MetricsBackendConfig::from_env()?,
            processor: ProcessorConfig::from_env()?,
            metrics_idle_timeout: Duration::from_secs(metrics_idle_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars_unset(
            [
                "METRICS_IDLE_TIMEOUT_SECS",
                "PROCESSOR_INTERVAL_SECS",
                "SWAPI_BASE_URL",
                "VICTORIA_METRICS_URL",
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "swapi_api");
                assert_eq!(config.metrics_idle_timeout, Duration::from_secs(3600));
                assert_eq!(config.processor.interval, Duration::from_secs(180));
                assert_eq!(config.swapi.base_url, "https://www.swapi.tech/api");
            },
        );
    }

    #[test]
    fn test_bad_idle_timeout_fails() {
        temp_env::with_var("METRICS_IDLE_TIMEOUT_SECS", Some("soon"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
