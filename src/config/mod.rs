//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → BreakerRegistry::from_configs builds one breaker per [[breakers]] entry
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; breakers own their parameters
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AppConfig;
pub use schema::BreakerConfig;
pub use schema::DemoConfig;
pub use schema::ObservabilityConfig;
pub use validation::validate_config;
