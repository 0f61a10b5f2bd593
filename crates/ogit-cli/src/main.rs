use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use ogit_repo::RepoConfig;
use tracing::Level;

mod cli;
mod commands;
mod dispatch;

use commands::{CommandContext, CommandRegistry};

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let cwd = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let ctx = CommandContext::new(cwd, RepoConfig::default());
    let registry = CommandRegistry::with_defaults();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    registry.execute(&cli.command, &ctx, &cli.args, &mut out)?;
    out.flush()?;
    Ok(())
}
