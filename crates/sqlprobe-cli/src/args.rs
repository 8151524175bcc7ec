//! Command-line arguments and settings resolution

use crate::logging::LogFormat;
use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use sqlprobe_query::ServiceSettings;
use std::io::Read;
use std::path::PathBuf;

/// How the response is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// The JSON response document
    #[default]
    Json,
    /// Result rows as a table followed by the plan and suggestions
    Table,
}

/// Run a SQL statement, time it, and analyze its execution plan
#[derive(Debug, Parser)]
#[command(name = "sqlprobe", version, about)]
pub struct Cli {
    /// SQL statement to run. Read from --file or stdin when omitted.
    pub query: Option<String>,

    /// Read the SQL statement from a file
    #[arg(short, long, conflicts_with = "query")]
    pub file: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, env = "SQLPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend type: mysql or sqlserver
    #[arg(short, long, env = "SQLPROBE_DATABASE_TYPE")]
    pub backend: Option<String>,

    /// Backend connection string
    #[arg(short = 'c', long, env = "SQLPROBE_CONNECTION_STRING", hide_env_values = true)]
    pub connection_string: Option<String>,

    /// Per round-trip deadline in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Row estimate above which the large row count suggestion fires
    #[arg(long)]
    pub large_row_threshold: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Pretty-print the JSON response
    #[arg(long)]
    pub pretty: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Enable debug logging for sqlprobe crates
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings from the config file, if any, with command-line values on top
    pub fn settings(&self) -> Result<ServiceSettings> {
        let mut settings = match &self.config {
            Some(path) => ServiceSettings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => ServiceSettings::default(),
        };

        if let Some(backend) = &self.backend {
            settings.database.backend = Some(backend.clone());
        }
        if let Some(connection_string) = &self.connection_string {
            settings.database.connection_string = Some(connection_string.clone());
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.execution.timeout_secs = Some(timeout_secs);
        }
        if let Some(threshold) = self.large_row_threshold {
            settings.analyzer.large_row_threshold = threshold;
        }
        Ok(settings)
    }

    /// The statement to run, from the argument, `--file`, or stdin
    pub fn read_query(&self) -> Result<String> {
        let query = match (&self.query, &self.file) {
            (Some(query), _) => query.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read query from {}", path.display()))?,
            (None, None) => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read query from stdin")?;
                buf
            }
        };
        if query.trim().is_empty() {
            bail!("no SQL statement given");
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sqlprobe").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[database]\ntype = \"mysql\"\nconnection_string = \"Server=a\"\n[analyzer]\nlarge_row_threshold = 7"
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let cli = parse(&["--config", path, "--backend", "sqlserver", "SELECT 1"]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.database.backend.as_deref(), Some("sqlserver"));
        assert_eq!(settings.database.connection_string.as_deref(), Some("Server=a"));
        assert_eq!(settings.analyzer.large_row_threshold, 7);
    }

    #[test]
    fn test_threshold_and_timeout_flags() {
        let cli = parse(&[
            "-b",
            "mysql",
            "-c",
            "Server=x",
            "--timeout-secs",
            "3",
            "--large-row-threshold",
            "50",
            "SELECT 1",
        ]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.execution.timeout_secs, Some(3));
        assert_eq!(settings.analyzer.large_row_threshold, 50);
    }

    #[test]
    fn test_query_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "SELECT * FROM orders").unwrap();
        let cli = parse(&["--file", file.path().to_str().unwrap()]);
        assert_eq!(cli.read_query().unwrap(), "SELECT * FROM orders");
    }

    #[test]
    fn test_query_and_file_conflict() {
        let result = Cli::try_parse_from(["sqlprobe", "--file", "q.sql", "SELECT 1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_query_rejected() {
        let cli = parse(&["   "]);
        assert!(cli.read_query().is_err());
    }

    #[test]
    fn test_output_defaults() {
        let cli = parse(&["SELECT 1"]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_format, LogFormat::Pretty);
        assert!(!cli.pretty);
    }
}
