//! Process-wide structured logging.
//!
//! Operational logs go to stderr so that `frontctl dispatch` can print the
//! rendered page on stdout untouched. Failure records are not written
//! here; see [`crate::recovery::FileFailureLog`].

use anyhow::{Context, Result};
use std::env;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for machines, pretty-print for people
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub log_level: String,
    pub format: LogFormat,
    /// Extra `EnvFilter` directives, comma separated
    pub target_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
        }
    }
}

impl LogConfig {
    /// Read `FRONTCTL_LOG_LEVEL`, `FRONTCTL_LOG_FORMAT` and
    /// `FRONTCTL_LOG_TARGET_FILTER`.
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("FRONTCTL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("FRONTCTL_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            ),
            target_filter: env::var("FRONTCTL_LOG_TARGET_FILTER").ok(),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Install the global subscriber.
///
/// Output is buffered on a background thread; keep the returned guard
/// alive until exit so pending lines are flushed.
///
/// ```no_run
/// use frontctl::logging::{init_logging_with_config, LogConfig};
///
/// let _guard = init_logging_with_config(&LogConfig::from_env())
///     .expect("Failed to initialize logging");
/// ```
pub fn init_logging_with_config(config: &LogConfig) -> Result<WorkerGuard> {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));

    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',') {
            let filter = filter.trim();
            if filter.is_empty() {
                continue;
            }
            match filter.parse() {
                Ok(directive) => env_filter = env_filter.add_directive(directive),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
            }
        }
    }

    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_span_list(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_level_falls_back_to_info() {
        let mut config = LogConfig::default();
        assert_eq!(config.level(), Level::INFO);
        config.log_level = "DEBUG".into();
        assert_eq!(config.level(), Level::DEBUG);
        config.log_level = "verbose".into();
        assert_eq!(config.level(), Level::INFO);
    }
}
