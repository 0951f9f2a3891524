use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use std::time::Duration;

/// Where the read side sends PromQL queries.
#[derive(Debug, Clone)]
pub struct MetricsBackendConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for MetricsBackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8428".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl MetricsBackendConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FromEnv for MetricsBackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_or_default("VICTORIA_METRICS_URL", "http://localhost:8428");
        let timeout_secs: u64 = env_parse("VICTORIA_METRICS_TIMEOUT_SECS", "30")?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars_unset(
            ["VICTORIA_METRICS_URL", "VICTORIA_METRICS_TIMEOUT_SECS"],
            || {
                let config = MetricsBackendConfig::from_env().unwrap();
                assert_eq!(config.url, "http://localhost:8428");
                assert_eq!(config.timeout, Duration::from_secs(30));
            },
        );
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("VICTORIA_METRICS_URL", Some("http://vm:8428/")),
                ("VICTORIA_METRICS_TIMEOUT_SECS", Some("5")),
            ],
            || {
                let config = MetricsBackendConfig::from_env().unwrap();
                assert_eq!(config.url, "http://vm:8428");
                assert_eq!(config.timeout, Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_timeout() {
        temp_env::with_var("VICTORIA_METRICS_TIMEOUT_SECS", Some("soon"), || {
            assert!(MetricsBackendConfig::from_env().is_err());
        });
    }
}
