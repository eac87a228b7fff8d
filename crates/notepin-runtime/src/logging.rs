#![forbid(unsafe_code)]

//! Process-wide `tracing` subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Output shape for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Read `NOTEPIN_LOG_FORMAT` (`json` or anything else for compact).
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("NOTEPIN_LOG_FORMAT").as_deref() {
            Ok("json") => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Build the filter: `RUST_LOG` when set and valid, else `fallback`, else
/// `info`.
#[must_use]
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a stderr subscriber. Returns `false` if one was already set.
pub fn init_logging(filter: &str) -> bool {
    init_logging_with(filter, LogFormat::from_env())
}

pub fn init_logging_with(filter: &str, format: LogFormat) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(filter));
    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.is_ok()
}
