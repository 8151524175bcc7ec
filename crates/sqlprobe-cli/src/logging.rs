//! Logging setup for the sqlprobe binary
//!
//! Everything is written to stderr so stdout carries only the response.

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, colored when stderr is a terminal
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            include_location: cfg!(debug_assertions),
            default_filter: "warn,sqlprobe_cli=info,sqlprobe_query=info,sqlprobe_drivers=info"
                .to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Raise the default filter to debug for all sqlprobe crates
    pub fn verbose(mut self) -> Self {
        self.default_filter = "info,sqlprobe_cli=debug,sqlprobe_core=debug,sqlprobe_query=debug,sqlprobe_drivers=debug,sqlprobe_driver_mysql=debug,sqlprobe_driver_mssql=debug".to_string();
        self
    }
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured default filter.
pub fn init(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).try_init()?;

    tracing::debug!(format = ?config.format, "logging initialized");
    Ok(())
}
