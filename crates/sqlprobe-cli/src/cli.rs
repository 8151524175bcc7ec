//! sqlprobe - run a SQL statement, time it, and analyze its execution plan
//!
//! The response document goes to stdout; logs go to stderr. The process exits
//! with a failure status when the statement could not be executed, and with
//! status 2 when the backend configuration is unusable.

mod args;
mod logging;
mod output;

use anyhow::Result;
use args::Cli;
use clap::Parser;
use logging::LoggingConfig;
use sqlprobe_drivers::DriverRegistry;
use sqlprobe_query::QueryService;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default().with_format(cli.log_format);
    if cli.verbose {
        logging = logging.verbose();
    }
    logging::init(logging)?;

    let settings = cli.settings()?;
    let registry = DriverRegistry::with_defaults();
    let service = match QueryService::from_settings(&settings, &registry) {
        Ok(service) => service,
        Err(e) if e.is_configuration_defect() => {
            tracing::error!(error = %e, "invalid backend configuration");
            eprintln!("error: {}\n\n{}", e, output::backend_help(&registry));
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!(backend = %service.backend(), "query service ready");

    let query = cli.read_query()?;

    let response = service.run(&query).await;
    println!("{}", output::render(&response, cli.output, cli.pretty)?);

    Ok(if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
