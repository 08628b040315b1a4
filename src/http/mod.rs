//! HTTP harness around the CORS filter.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned and propagated)
//!     → CorsLayer (preflight answered or actual request decorated)
//!     → echo handler
//! ```

pub mod request;
pub mod server;

pub use request::{RequestIdMaker, X_REQUEST_ID};
pub use server::HttpServer;
