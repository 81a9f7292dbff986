use crate::domain::Level;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// HTTP-stack targets kept quiet unless RUST_LOG asks otherwise.
const DEFAULT_DIRECTIVES: &[(&str, Level)] = &[
    ("hyper", Level::Warn),
    ("reqwest", Level::Warn),
    ("h2", Level::Warn),
    ("rustls", Level::Warn),
];

#[derive(Error, Debug)]
pub enum LoggingInitError {
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Failed to set global tracing subscriber: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Filter string for the tool's own diagnostics. `RUST_LOG` wins when set.
pub fn build_filter_string(default_level: Level) -> String {
    if let Ok(from_env) = std::env::var(EnvFilter::DEFAULT_ENV)
        && !from_env.trim().is_empty()
    {
        return from_env;
    }

    let mut parts = Vec::with_capacity(DEFAULT_DIRECTIVES.len() + 1);
    parts.push(tracing_level_name(default_level).to_string());
    for (target, level) in DEFAULT_DIRECTIVES {
        parts.push(format!("{target}={}", tracing_level_name(*level)));
    }
    parts.join(",")
}

fn tracing_level_name(level: Level) -> &'static str {
    match level {
        // EnvFilter has no "fatal"
        Level::Fatal => "error",
        other => other.as_str(),
    }
}

/// Installs the global subscriber, writing to stderr so stdout stays free.
pub fn setup_logging(level: Level, format: LogFormat) -> Result<(), LoggingInitError> {
    let filter_string = build_filter_string(level);
    let env_filter =
        EnvFilter::try_new(&filter_string).map_err(|source| LoggingInitError::InvalidFilter {
            filter: filter_string.clone(),
            source,
        })?;

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .compact(),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_filter_quiets_http_stack() {
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        let filter = build_filter_string(Level::Info);
        assert_eq!(filter, "info,hyper=warn,reqwest=warn,h2=warn,rustls=warn");
        assert!(EnvFilter::try_new(&filter).is_ok());
    }

    #[test]
    #[serial]
    fn test_rust_log_overrides_default() {
        unsafe {
            std::env::set_var("RUST_LOG", "debug");
        }
        assert_eq!(build_filter_string(Level::Warn), "debug");
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
    }

    #[test]
    #[serial]
    fn test_fatal_maps_to_error() {
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        assert!(build_filter_string(Level::Fatal).starts_with("error,"));
    }
}
