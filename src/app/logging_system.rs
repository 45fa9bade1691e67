use super::config::LogLevel;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Failed to set global tracing subscriber: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Crates whose chatter is capped at `warn` unless `RUST_LOG` says otherwise.
const DEFAULT_DIRECTIVES: &[(&str, LogLevel)] = &[
    ("hyper", LogLevel::Warn),
    ("hyper_util", LogLevel::Warn),
    ("reqwest", LogLevel::Warn),
    ("h2", LogLevel::Warn),
    ("rustls", LogLevel::Warn),
];

/// Builds the filter string: `RUST_LOG` when set, otherwise the default
/// level followed by the per-crate directives.
pub fn build_filter_string(default_level: LogLevel) -> String {
    if let Ok(from_env) = std::env::var(EnvFilter::DEFAULT_ENV)
        && !from_env.trim().is_empty()
    {
        return from_env;
    }

    let mut filter_parts = Vec::with_capacity(DEFAULT_DIRECTIVES.len() + 1);
    filter_parts.push(default_level.as_str().to_string());
    for (target, level) in DEFAULT_DIRECTIVES {
        filter_parts.push(format!("{}={}", target, level.as_str()));
    }
    filter_parts.join(",")
}

/// Installs the global tracing subscriber for the command-line tool.
pub fn setup_logging(default_level: LogLevel, json: bool) -> Result<(), LoggingError> {
    let filter = build_filter_string(default_level);
    let env_filter = EnvFilter::try_new(&filter).map_err(|source| LoggingError::InvalidFilter {
        filter: filter.clone(),
        source,
    })?;

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_filter_string_includes_default_directives() {
        unsafe {
            std::env::remove_var("RUST_LOG");
        }

        let filter = build_filter_string(LogLevel::Debug);

        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("reqwest=warn"));
        assert!(EnvFilter::try_new(&filter).is_ok());
    }

    #[test]
    #[serial]
    fn test_rust_log_overrides_defaults() {
        unsafe {
            std::env::set_var("RUST_LOG", "elmah_io=trace");
        }

        let filter = build_filter_string(LogLevel::Warn);

        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        assert_eq!(filter, "elmah_io=trace");
    }
}
