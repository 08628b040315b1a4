//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, CORS lint warnings)
//!     → FilterConfig (validated, immutable)
//!     → cors section normalized once into PolicyConfig
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Server settings are validated strictly; the CORS policy never is,
//!   it only produces warnings

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CorsConfig, FilterConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    PreflightRejection, TimeoutConfig,
};
