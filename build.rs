// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Arguments shared by every command that works on a recipe's work directory
fn kitchen_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("recipe").required(true).help("Path to the recipe file"))
        .arg(
            Arg::new("setting")
                .short('s')
                .long("setting")
                .value_name("AXIS=VALUE")
                .action(clap::ArgAction::Append)
                .help("Override a setting axis (repeatable)"),
        )
        .arg(
            Arg::new("build_root")
                .long("build-root")
                .value_name("DIR")
                .help("Root directory for work directories (default: ./build)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for packages and manifests (default: ./packages)"),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel build jobs (default: auto)"),
        )
}

fn build_cli() -> Command {
    Command::new("larder")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Larder Contributors")
        .about("Package recipe runner: fetch, build, test and stage libraries")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (-v: debug, -vv: trace)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Configuration file (TOML with [kitchen] and [settings] tables)"),
        )
        .subcommand(kitchen_args(
            Command::new("create")
                .about("Fetch, build and package a recipe from a clean work directory"),
        ))
        .subcommand(kitchen_args(
            Command::new("source").about("Fetch the source into an empty work directory"),
        ))
        .subcommand(kitchen_args(
            Command::new("build").about("Run the build commands against a fetched source"),
        ))
        .subcommand(kitchen_args(
            Command::new("package").about("Copy staged artifacts into the package layout"),
        ))
        .subcommand(
            Command::new("inspect")
                .about("Show recipe metadata")
                .arg(Arg::new("recipe").required(true).help("Path to the recipe file"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(clap::ArgAction::SetTrue)
                        .help("Print the parsed recipe as JSON"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a recipe without cooking it")
                .arg(Arg::new("recipe").required(true).help("Path to the recipe file")),
        )
        .subcommand(kitchen_args(
            Command::new("verify").about("Check a cooked package against its manifest"),
        ))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(Arg::new("shell").required(true).help("Shell type")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("larder.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
