//! Structured logging through `tracing`.
//!
//! Diagnostics go to stderr; stdout carries the diagram text.
//!
//! The filter is taken from the explicit level, else `AAS2PUML_LOG`, else
//! `RUST_LOG`, else `warn`. Directive syntax works in all of them, e.g.
//! `AAS2PUML_LOG=aas2puml::transform=debug`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "AAS2PUML_LOG";
const DEFAULT_LEVEL: &str = "warn";

/// Filter directive in effect for `level`.
pub fn log_directive(level: Option<&str>) -> String {
    level
        .map(|s| s.to_string())
        .or_else(|| std::env::var(LOG_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Install the global subscriber. Fails when the directive does not parse
/// or a subscriber is already installed.
pub fn init_logging(level: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(log_directive(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}
