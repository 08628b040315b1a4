//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! CORS filter produces:
//!     → logging.rs (structured log events, per-decision diagnostics in debug mode)
//!     → metrics.rs (counters per outcome)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metrics are cheap and become no-ops without an installed recorder

pub mod logging;
pub mod metrics;
