//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the breaker
//! demo. All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Breaker guarding the delayed demo service.
pub const DELAYED_SERVICE: &str = "delayed-service";

/// Breaker guarding the quick demo service.
pub const QUICK_SERVICE: &str = "quick-service";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// One entry per protected dependency.
    pub breakers: Vec<BreakerConfig>,

    /// Monitoring demo settings.
    pub demo: DemoConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            observability: ObservabilityConfig::default(),
            breakers: vec![
                BreakerConfig::named(DELAYED_SERVICE),
                BreakerConfig::named(QUICK_SERVICE),
            ],
            demo: DemoConfig::default(),
        }
    }
}

impl AppConfig {
    /// Look up a breaker entry by name.
    pub fn breaker(&self, name: &str) -> Option<&BreakerConfig> {
        self.breakers.iter().find(|b| b.name == name)
    }
}

/// Circuit breaker parameters for one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BreakerConfig {
    /// Dependency name, used in logs and metric labels.
    pub name: String,

    /// Consecutive failures that trip the circuit.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Quiet period after the last failure before a trial call, in milliseconds.
    #[serde(default = "default_retry_timeout_ms")]
    pub retry_timeout_ms: u64,

    /// Advisory per-call deadline in milliseconds.
    ///
    /// The breaker does not enforce it; callers wrap their own operation.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_failure_threshold() -> u32 {
    1
}

fn default_retry_timeout_ms() -> u64 {
    2000
}

fn default_request_timeout_ms() -> u64 {
    3000
}

impl BreakerConfig {
    /// Entry with default parameters.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure_threshold: default_failure_threshold(),
            retry_timeout_ms: default_retry_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    pub fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Monitoring demo configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// How long the delayed service stays down after start, in milliseconds.
    pub delayed_service_startup_ms: u64,

    /// Number of polling rounds.
    pub iterations: u32,

    /// Pause between rounds in milliseconds.
    pub interval_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            delayed_service_startup_ms: 4000,
            iterations: 10,
            interval_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.breakers.len(), 2);
        assert_eq!(config.observability.log_format, "pretty");
        assert_eq!(config.demo.iterations, 10);
    }

    #[test]
    fn test_breaker_entry_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [[breakers]]
            name = "payments"
            failure_threshold = 5
            "#,
        )
        .unwrap();

        let entry = config.breaker("payments").unwrap();
        assert_eq!(entry.failure_threshold, 5);
        assert_eq!(entry.retry_timeout(), Duration::from_secs(2));
        assert_eq!(entry.request_timeout(), Duration::from_secs(3));
        assert!(config.breaker(DELAYED_SERVICE).is_none());
    }
}
