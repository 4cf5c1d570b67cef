// src/logging.rs
//! Tracing subscriber setup

use crate::error::{DiagError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber filtered by `RUST_LOG`, defaulting to `level`.
/// Unknown levels fall back to `info`.
pub fn init_logging(level: &str) -> Result<()> {
    let level = normalize_level(level);

    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .map_err(|e| DiagError::Config(format!("Invalid log level '{}': {}", level, e)))?,
        )
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default());

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .map_err(|e| DiagError::Other(format!("Failed to install tracing subscriber: {}", e)))
}

fn normalize_level(level: &str) -> &str {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            "info"
        }
    }
}
