//! Dry-run a request against a CORS policy, without a server.
//!
//! With `--debug` (or `cors.debug` in the config) each check is logged to
//! stderr.
//!
//! ```text
//! cors-check --config cors.toml --method OPTIONS \
//!     --origin https://app.com --request-method POST --request-headers X-Token
//! ```

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::body::Body;
use axum::http::{Request, Response};
use clap::Parser;
use serde_json::{json, Map, Value};

use cors_filter::config::validation::lint_cors;
use cors_filter::config::{load_config, FilterConfig};
use cors_filter::cors::CorsFilter;
use cors_filter::observability::logging;

#[derive(Parser)]
#[command(name = "cors-check")]
#[command(about = "Evaluate one request against a CORS policy", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request method, case-sensitive.
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Origin header.
    #[arg(short, long)]
    origin: Option<String>,

    /// Access-Control-Request-Method header.
    #[arg(long)]
    request_method: Option<String>,

    /// Access-Control-Request-Headers header.
    #[arg(long)]
    request_headers: Option<String>,

    /// Log every check to stderr, as if `cors.debug` were set.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FilterConfig::default(),
    };
    config.cors.debug |= cli.debug;
    // Diagnostics go to stderr; the report owns stdout.
    logging::init_cli_logging(&config);

    let filter = CorsFilter::from_config(&config.cors);

    let mut builder = Request::builder().method(cli.method.as_str()).uri("/");
    if let Some(origin) = &cli.origin {
        builder = builder.header("Origin", origin);
    }
    if let Some(method) = &cli.request_method {
        builder = builder.header("Access-Control-Request-Method", method);
    }
    if let Some(headers) = &cli.request_headers {
        builder = builder.header("Access-Control-Request-Headers", headers);
    }
    let request = builder.body(Body::empty())?;

    let invoked = AtomicBool::new(false);
    let next_invoked = &invoked;
    let response = filter
        .evaluate(request, move |_req: Request<Body>| async move {
            next_invoked.store(true, Ordering::SeqCst);
            Ok::<_, Infallible>(Response::new(Body::empty()))
        })
        .await?;

    let mut headers = Map::new();
    for (name, value) in response.headers() {
        let value = Value::String(value.to_str().unwrap_or("<binary>").to_string());
        match headers.get_mut(name.as_str()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => *existing = Value::Array(vec![existing.clone(), value]),
            None => {
                headers.insert(name.as_str().to_string(), value);
            }
        }
    }

    let warnings: Vec<String> = lint_cors(&config.cors).iter().map(|w| w.to_string()).collect();

    let report = json!({
        "status": response.status().as_u16(),
        "headers": headers,
        "next_invoked": invoked.load(Ordering::SeqCst),
        "warnings": warnings,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
