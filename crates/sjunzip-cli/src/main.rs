//! sjunzip CLI - extracts ZIP archives whose entry names are Shift_JIS.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    init_logging(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let (operation, result) = match &cli.command {
        cli::Commands::Extract(args) => (
            "extract",
            commands::extract::execute(args, &*formatter, cli.quiet, cli.json),
        ),
        cli::Commands::List(args) => ("list", commands::list::execute(args, &*formatter)),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            ("completion", Ok(()))
        }
    };

    if let Err(err) = &result
        && !err.is::<error::BatchFailed>()
    {
        formatter.format_error(operation, err);
    }

    result
}

/// Logs go to stderr. `RUST_LOG` overrides the level picked from flags.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
