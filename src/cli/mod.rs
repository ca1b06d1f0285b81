// src/cli/mod.rs
//! CLI definitions for larder
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Cooking commands:
//! - `create` - Clean, fetch, build and package in one go
//! - `source` / `build` / `package` - Run a single phase
//!
//! Recipe tools:
//! - `inspect` - Show recipe metadata
//! - `validate` - Check a recipe without cooking it
//! - `verify` - Check a package against its manifest

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "larder")]
#[command(author = "Larder Contributors")]
#[command(version)]
#[command(about = "Package recipe runner: fetch, build, test and stage libraries", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML with [kitchen] and [settings] tables)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that cooks or inspects a work directory
#[derive(Args, Debug, Clone)]
pub struct KitchenArgs {
    /// Path to the recipe file
    pub recipe: String,

    /// Override a setting axis (repeatable), e.g. -s build_type=Debug
    #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE")]
    pub settings: Vec<String>,

    /// Root directory for work directories (default: ./build)
    #[arg(long, value_name = "DIR")]
    pub build_root: Option<String>,

    /// Output directory for packages and manifests (default: ./packages)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<String>,

    /// Number of parallel build jobs (default: auto)
    #[arg(short, long)]
    pub jobs: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, build and package a recipe from a clean work directory
    Create {
        #[command(flatten)]
        args: KitchenArgs,
    },

    /// Fetch the source into an empty work directory
    Source {
        #[command(flatten)]
        args: KitchenArgs,
    },

    /// Run the build commands against a fetched source
    Build {
        #[command(flatten)]
        args: KitchenArgs,
    },

    /// Copy staged artifacts into the package layout
    Package {
        #[command(flatten)]
        args: KitchenArgs,
    },

    /// Show recipe metadata
    Inspect {
        /// Path to the recipe file
        recipe: String,

        /// Print the parsed recipe as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a recipe without cooking it
    Validate {
        /// Path to the recipe file
        recipe: String,
    },

    /// Check a cooked package against its manifest
    Verify {
        #[command(flatten)]
        args: KitchenArgs,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_with_settings() {
        let cli = Cli::try_parse_from([
            "larder",
            "-v",
            "create",
            "recipes/libeasyyaml.toml",
            "-s",
            "build_type=Debug",
            "--setting",
            "compiler=clang",
            "-j",
            "8",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Create { args } => {
                assert_eq!(args.recipe, "recipes/libeasyyaml.toml");
                assert_eq!(args.settings, vec!["build_type=Debug", "compiler=clang"]);
                assert_eq!(args.jobs, Some(8));
                assert!(args.output.is_none());
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["larder", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Bash }));
    }
}
