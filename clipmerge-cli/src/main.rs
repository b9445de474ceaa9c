// clipmerge-cli/src/main.rs
//
// Entry point for the clipmerge binary: parses arguments, sets up logging,
// runs the selected command and maps failures to exit code 1.

use clap::Parser;
use clipmerge_cli::logging::init_logging;
use clipmerge_cli::{Cli, Commands, run_merge, run_probe, run_validate};
use clipmerge_core::JobError;
use owo_colors::OwoColorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), user_message(&e));
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(log_path) = init_logging(cli.verbose, cli.log_dir.as_deref())? {
        log::info!("Writing log to {}", log_path.display());
    }

    let config_file = cli.config.as_deref();
    match cli.command {
        Commands::Merge(args) => run_merge(args, config_file),
        Commands::Probe(args) => run_probe(args, config_file),
        Commands::Validate(args) => run_validate(args, config_file),
    }
}

/// Message shown to the user; engine diagnostics for failed jobs stay in the log.
fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<JobError>() {
        Some(job_error) => job_error.user_message(),
        None => format!("{err:#}"),
    }
}
