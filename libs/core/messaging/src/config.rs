//! Background processor settings.

use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use std::time::Duration;

/// How often the processor cycles and how it labels its heartbeat.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Sleep between cycles
    pub interval: Duration,
    /// `source` field of each heartbeat payload
    pub source: String,
}

impl ProcessorConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(180),
            source: "background-processor".to_string(),
        }
    }
}

impl FromEnv for ProcessorConfig {
    /// - `PROCESSOR_INTERVAL_SECS` (default 180)
    /// - `PROCESSOR_SOURCE` (default background-processor)
    fn from_env() -> Result<Self, ConfigError> {
        let secs: u64 = env_parse("PROCESSOR_INTERVAL_SECS", "180")?;
        if secs == 0 {
            return Err(ConfigError::ParseError {
                key: "PROCESSOR_INTERVAL_SECS".to_string(),
                details: "interval must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            interval: Duration::from_secs(secs),
            source: env_or_default("PROCESSOR_SOURCE", "background-processor"),
        })
    }
}
