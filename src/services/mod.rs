//! Protected dependencies and the monitoring demo built on them.
//!
//! # Data Flow
//! ```text
//! MonitoringService
//!     → local resource (never guarded)
//!     → ProtectedService<DelayedRemoteService> → CircuitBreaker
//!     → ProtectedService<QuickRemoteService>   → CircuitBreaker
//! ```

pub mod monitoring;
pub mod remote;

pub use monitoring::MonitoringService;
pub use remote::{
    DelayedRemoteService, ProtectedService, QuickRemoteService, RemoteService, RemoteServiceError,
};
