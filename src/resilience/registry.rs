//! Breaker registry.
//!
//! # Responsibilities
//! - Own one breaker per logical dependency, keyed by name
//! - Build breakers from `[[breakers]]` configuration entries
//! - Expose snapshots of every breaker for dashboards

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use crate::config::BreakerConfig;
use crate::resilience::circuit_breaker::{BreakerSnapshot, CircuitBreaker};
use crate::resilience::clock::{Clock, SystemClock};
use crate::resilience::error::InvalidConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("breaker '{0}' is already registered")]
    Duplicate(String),

    #[error("breaker '{name}': {source}")]
    Invalid {
        name: String,
        #[source]
        source: InvalidConfig,
    },
}

/// Concurrent map of dependency name to its breaker.
///
/// Clones share the same breakers.
#[derive(Debug, Clone)]
pub struct BreakerRegistry {
    breakers: Arc<DashMap<String, Arc<CircuitBreaker>>>,
    clock: Arc<dyn Clock>,
}

impl BreakerRegistry {
    /// Create an empty registry whose breakers use the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty registry whose breakers share `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            breakers: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Build a registry holding one breaker per configuration entry.
    pub fn from_configs(
        configs: &[BreakerConfig],
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RegistryError> {
        let registry = Self::with_clock(clock);
        for config in configs {
            registry.register(config)?;
        }
        Ok(registry)
    }

    /// Add a breaker; fails if the name is already taken.
    pub fn register(&self, config: &BreakerConfig) -> Result<Arc<CircuitBreaker>, RegistryError> {
        match self.breakers.entry(config.name.clone()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate(config.name.clone())),
            Entry::Vacant(slot) => {
                let breaker = Arc::new(self.build(config)?);
                slot.insert(breaker.clone());
                tracing::info!(
                    breaker = %config.name,
                    failure_threshold = config.failure_threshold,
                    retry_timeout_ms = config.retry_timeout_ms,
                    request_timeout = ?config.request_timeout(),
                    "Breaker registered"
                );
                Ok(breaker)
            }
        }
    }

    /// Return the existing breaker for `config.name`, creating it if absent.
    ///
    /// An existing breaker keeps its original parameters.
    pub fn get_or_register(
        &self,
        config: &BreakerConfig,
    ) -> Result<Arc<CircuitBreaker>, RegistryError> {
        match self.breakers.entry(config.name.clone()) {
            Entry::Occupied(existing) => Ok(existing.get().clone()),
            Entry::Vacant(slot) => {
                let breaker = Arc::new(self.build(config)?);
                slot.insert(breaker.clone());
                Ok(breaker)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// Snapshot every breaker, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snapshots: Vec<_> = self
            .breakers
            .iter()
            .map(|r| r.value().snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    fn build(&self, config: &BreakerConfig) -> Result<CircuitBreaker, RegistryError> {
        CircuitBreaker::from_config_with_clock(config, self.clock.clone()).map_err(|source| {
            RegistryError::Invalid {
                name: config.name.clone(),
                source,
            }
        })
    }
}

impl Default for BreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
