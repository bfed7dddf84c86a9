//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (threshold > 0, iterations > 0)
//! - Detect duplicate breaker names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("breaker #{index} has an empty name")]
    EmptyBreakerName { index: usize },

    #[error("breaker '{0}' is defined more than once")]
    DuplicateBreaker(String),

    #[error("breaker '{0}': failure_threshold must be greater than zero")]
    ZeroFailureThreshold(String),

    #[error("demo.iterations must be greater than zero")]
    ZeroIterations,

    #[error("observability.log_format must be 'pretty' or 'json', got '{0}'")]
    UnknownLogFormat(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, breaker) in config.breakers.iter().enumerate() {
        if breaker.name.trim().is_empty() {
            errors.push(ValidationError::EmptyBreakerName { index });
        } else if !seen.insert(breaker.name.as_str()) {
            errors.push(ValidationError::DuplicateBreaker(breaker.name.clone()));
        }
        if breaker.failure_threshold == 0 {
            errors.push(ValidationError::ZeroFailureThreshold(breaker.name.clone()));
        }
    }

    if config.demo.iterations == 0 {
        errors.push(ValidationError::ZeroIterations);
    }

    let obs = &config.observability;
    if !matches!(obs.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::UnknownLogFormat(obs.log_format.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BreakerConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.breakers.push(BreakerConfig::named("quick-service"));
        config.breakers.push(BreakerConfig {
            failure_threshold: 0,
            ..BreakerConfig::named("")
        });
        config.demo.iterations = 0;
        config.observability.log_format = "xml".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "not-an-addr".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateBreaker("quick-service".into()),
                ValidationError::EmptyBreakerName { index: 3 },
                ValidationError::ZeroFailureThreshold(String::new()),
                ValidationError::ZeroIterations,
                ValidationError::UnknownLogFormat("xml".into()),
                ValidationError::InvalidMetricsAddress("not-an-addr".into()),
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "garbage".into();
        assert!(validate_config(&config).is_ok());
    }
}
