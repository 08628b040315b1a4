//! CORS policy engine for HTTP middleware chains.
//!
//! The engine lives in [`cors`]; everything else is the ambient harness
//! (configuration, logging, metrics, a demo server).

pub mod config;
pub mod cors;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::FilterConfig;
pub use cors::{CorsFilter, CorsLayer, PolicyConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
