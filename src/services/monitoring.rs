//! Monitoring service polling a local resource and two remote services.
//!
//! Remote calls go through their breakers. Whatever comes back, a real
//! response, a real failure or a stale short-circuited failure, is rendered
//! as a plain message so the monitor never errors out itself.

use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::{AppConfig, BreakerConfig, DELAYED_SERVICE, QUICK_SERVICE};
use crate::resilience::registry::RegistryError;
use crate::resilience::{BreakerError, BreakerRegistry, Clock};
use crate::services::remote::{
    DelayedRemoteService, ProtectedService, QuickRemoteService, RemoteService, RemoteServiceError,
};

pub type SharedService = Arc<dyn RemoteService>;

pub struct MonitoringService {
    delayed: ProtectedService<SharedService>,
    quick: ProtectedService<SharedService>,
}

impl MonitoringService {
    pub fn new(delayed: ProtectedService<SharedService>, quick: ProtectedService<SharedService>) -> Self {
        Self { delayed, quick }
    }

    /// Wire the demo services to their breakers in `registry`.
    ///
    /// Breakers missing from the configuration are created with defaults.
    pub fn from_config(
        config: &AppConfig,
        registry: &BreakerRegistry,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RegistryError> {
        let breaker_config = |name: &str| {
            config
                .breaker(name)
                .cloned()
                .unwrap_or_else(|| BreakerConfig::named(name))
        };
        let delayed_breaker = registry.get_or_register(&breaker_config(DELAYED_SERVICE))?;
        let quick_breaker = registry.get_or_register(&breaker_config(QUICK_SERVICE))?;

        let startup_delay = Duration::from_millis(config.demo.delayed_service_startup_ms);
        let delayed: SharedService = Arc::new(DelayedRemoteService::with_clock(startup_delay, clock));
        let quick: SharedService = Arc::new(QuickRemoteService);

        Ok(Self::new(
            ProtectedService::new(delayed, delayed_breaker),
            ProtectedService::new(quick, quick_breaker),
        ))
    }

    /// The local resource needs no protection.
    pub fn local_resource_response(&self) -> String {
        "Local Service is working".to_string()
    }

    pub fn delayed_service_response(&self) -> String {
        render(DELAYED_SERVICE, self.delayed.attempt_request())
    }

    pub fn quick_service_response(&self) -> String {
        render(QUICK_SERVICE, self.quick.attempt_request())
    }

    pub fn delayed(&self) -> &ProtectedService<SharedService> {
        &self.delayed
    }

    pub fn quick(&self) -> &ProtectedService<SharedService> {
        &self.quick
    }
}

fn render(service: &str, result: Result<String, BreakerError<RemoteServiceError>>) -> String {
    match result {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(service, stale = e.is_short_circuited(), error = %e, "Remote call did not succeed");
            e.to_string()
        }
    }
}
