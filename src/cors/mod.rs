//! CORS decision engine.
//!
//! # Data Flow
//! ```text
//! CorsConfig (raw, from config file)
//!     → policy.rs (normalize once into PolicyConfig)
//!     → shared via Arc, never mutated
//!
//! Per request:
//!     → filter.rs (classify: OPTIONS = preflight, else actual)
//!     → check.rs (ordered named checks, first failure wins)
//!     → headers.rs (accumulate CORS headers, apply to response)
//!     → layer.rs (tower adapter around the filter)
//! ```
//!
//! # Design Decisions
//! - Policy values are normalized at construction; only request values are
//!   normalized per check
//! - Preflight failures are fatal (401); actual-request failures only
//!   withhold headers and let the request complete
//! - `next` is consumed by value, so it runs at most once per request
//! - No error type of its own: downstream errors propagate unchanged

/// Emits a `debug` event only when the policy's debug flag is on.
macro_rules! cors_debug {
    ($policy:expr, $($arg:tt)+) => {
        if $policy.debug() {
            tracing::debug!(target: $crate::observability::logging::DIAGNOSTICS_TARGET, $($arg)+);
        }
    };
}

pub mod check;
pub mod filter;
pub mod headers;
pub mod layer;
pub mod policy;

pub use check::{Check, Rejection, RequestView};
pub use filter::{CorsFilter, Next};
pub use headers::{parse_header_list, CorsHeaders};
pub use layer::{CorsLayer, CorsService};
pub use policy::{PolicyConfig, WildcardOrigin};
