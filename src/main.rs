// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::CookMode;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Create { args } => commands::cmd_cook(&args, config, CookMode::Create),
        Commands::Source { args } => commands::cmd_cook(&args, config, CookMode::Source),
        Commands::Build { args } => commands::cmd_cook(&args, config, CookMode::Build),
        Commands::Package { args } => commands::cmd_cook(&args, config, CookMode::Package),
        Commands::Inspect { recipe, json } => commands::cmd_inspect(&recipe, json),
        Commands::Validate { recipe } => commands::cmd_validate(&recipe),
        Commands::Verify { args } => commands::cmd_verify(&args, config),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "larder", &mut std::io::stdout());
            Ok(())
        }
    }
}
