use clap::Parser;
use frontctl::cli::{run_cli, Cli};
use frontctl::logging::{init_logging_with_config, LogConfig};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging_with_config(&LogConfig::from_env())?;
    let status = run_cli(cli, &mut std::io::stdout().lock())?;
    Ok(ExitCode::from(status))
}
