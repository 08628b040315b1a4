//! Structured logging.
//!
//! `RUST_LOG` takes precedence over `observability.log_level`. With
//! `cors.debug` set, the CORS diagnostics target is raised to `debug`
//! whatever the base level is.

use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::{FilterConfig, LogFormat};

/// Target of the per-decision CORS diagnostics.
pub const DIAGNOSTICS_TARGET: &str = "cors_filter::cors";

/// Build the filter used when `RUST_LOG` is unset.
pub fn default_filter(config: &FilterConfig) -> EnvFilter {
    let level = config.observability.log_level.to_lowercase();
    let filter = EnvFilter::new(format!("cors_filter={level},tower_http={level}"));
    with_diagnostics(filter, config)
}

fn with_diagnostics(filter: EnvFilter, config: &FilterConfig) -> EnvFilter {
    if !config.cors.debug {
        return filter;
    }
    match format!("{DIAGNOSTICS_TARGET}=debug").parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

fn env_or_default_filter(config: &FilterConfig) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => with_diagnostics(filter, config),
        Err(_) => default_filter(config),
    }
}

/// Install the global subscriber. Call once, at startup.
pub fn init_logging(config: &FilterConfig) {
    let registry = tracing_subscriber::registry().with(env_or_default_filter(config));

    match config.observability.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Install a subscriber that writes to stderr, leaving stdout to the tool.
pub fn init_cli_logging(config: &FilterConfig) {
    tracing_subscriber::registry()
        .with(env_or_default_filter(config))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
